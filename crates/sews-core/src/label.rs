//! Horizon label shifting.
//!
//! The target for hour `t` is the raw onset label at `t + horizon`. Hours
//! whose future label lies past the end of the timeline have no target and
//! are never materialized.

use sews_model::{ImputedTimeline, LabeledRow};

/// Coerces a raw label to an exact class: positive values are 1, the rest 0.
pub fn coerce_target(raw: f64) -> u8 {
    u8::from(raw > 0.0)
}

/// Builds labeled rows for one imputed timeline.
///
/// A timeline of `len` hours yields `len - horizon` rows (none when
/// `len <= horizon`), minus any whose future label was never recorded.
pub fn label_timeline(timeline: &ImputedTimeline, horizon: usize) -> Vec<LabeledRow> {
    let len = timeline.len();
    let labeled = len.saturating_sub(horizon);

    (0..labeled)
        .filter_map(|t| {
            let future = timeline.hours[t + horizon].onset_label?;
            Some(LabeledRow::new(
                timeline.patient_id.clone(),
                t,
                timeline.hours[t].features,
                coerce_target(future),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sews_model::{FEATURE_COUNT, ImputedHour, PatientId};

    fn imputed(labels: &[Option<f64>]) -> ImputedTimeline {
        let hours = labels
            .iter()
            .enumerate()
            .map(|(t, label)| {
                let mut features = [-1.0; FEATURE_COUNT];
                features[0] = t as f64;
                ImputedHour {
                    features,
                    onset_label: *label,
                }
            })
            .collect();
        ImputedTimeline {
            patient_id: PatientId::new("p1").unwrap(),
            hours,
        }
    }

    #[test]
    fn ten_hour_timeline_with_late_onset() {
        let mut labels = vec![Some(0.0); 10];
        labels[8] = Some(1.0);
        labels[9] = Some(1.0);
        let rows = label_timeline(&imputed(&labels), 6);

        let hours: Vec<usize> = rows.iter().map(|row| row.hour).collect();
        assert_eq!(hours, vec![0, 1, 2, 3]);
        let targets: Vec<u8> = rows.iter().map(|row| row.target).collect();
        assert_eq!(targets, vec![0, 0, 1, 1]);
        // Features come from the current hour, not the future one.
        assert_eq!(rows[2].features[0], 2.0);
    }

    #[test]
    fn short_timeline_yields_nothing() {
        assert!(label_timeline(&imputed(&[Some(1.0); 6]), 6).is_empty());
        assert!(label_timeline(&imputed(&[]), 6).is_empty());
        assert_eq!(label_timeline(&imputed(&[Some(1.0); 7]), 6).len(), 1);
    }

    #[test]
    fn unobservable_future_labels_are_dropped() {
        let labels = [Some(0.0), Some(0.0), None, Some(1.0)];
        let rows = label_timeline(&imputed(&labels), 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hour, 1);
        assert_eq!(rows[0].target, 1);
    }

    #[test]
    fn coerces_to_binary() {
        assert_eq!(coerce_target(0.0), 0);
        assert_eq!(coerce_target(1.0), 1);
        assert_eq!(coerce_target(2.0), 1);
        assert_eq!(coerce_target(-1.0), 0);
    }
}
