//! Per-patient missing-value imputation.
//!
//! Each column is filled forward (last known value persists until
//! re-measured), then backward (hours before the first measurement take
//! the first measurement), and whatever is still empty was never measured
//! for this patient and becomes the sentinel. Only one patient's timeline
//! is ever visible here, so nothing leaks between patients.

use sews_model::{FEATURE_COUNT, ImputedHour, ImputedTimeline, PatientTimeline};

/// Fills every gap in `timeline`.
///
/// The raw onset label gets the same forward/backward fill but no
/// sentinel: a label that cannot be filled stays unobservable.
pub fn impute_timeline(timeline: &PatientTimeline, sentinel: f64) -> ImputedTimeline {
    let len = timeline.len();

    let mut columns: Vec<Vec<Option<f64>>> = (0..FEATURE_COUNT)
        .map(|feature| {
            timeline
                .hours
                .iter()
                .map(|hour| hour.observation.get(feature))
                .collect()
        })
        .collect();
    for column in &mut columns {
        fill_gaps(column);
    }

    let mut labels: Vec<Option<f64>> = timeline.hours.iter().map(|h| h.onset_label).collect();
    fill_gaps(&mut labels);

    let hours = (0..len)
        .map(|t| {
            let mut features = [sentinel; FEATURE_COUNT];
            for (slot, column) in features.iter_mut().zip(&columns) {
                if let Some(value) = column[t] {
                    *slot = value;
                }
            }
            ImputedHour {
                features,
                onset_label: labels[t],
            }
        })
        .collect();

    ImputedTimeline {
        patient_id: timeline.patient_id.clone(),
        hours,
    }
}

/// Forward fill, then backward fill, in place.
fn fill_gaps(column: &mut [Option<f64>]) {
    let mut last = None;
    for value in column.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
    let mut next = None;
    for value in column.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sews_model::{HourRecord, Observation, PatientId};

    fn timeline(hr: &[Option<f64>], labels: &[Option<f64>]) -> PatientTimeline {
        let hours = hr
            .iter()
            .zip(labels)
            .map(|(value, label)| {
                let mut observation = Observation::empty();
                observation.set(0, *value);
                HourRecord::new(observation, *label)
            })
            .collect();
        PatientTimeline::new(PatientId::new("p1").unwrap(), hours)
    }

    #[test]
    fn forward_then_backward_fill() {
        let input = timeline(
            &[None, Some(80.0), None, None, Some(90.0), None],
            &[Some(0.0); 6],
        );
        let imputed = impute_timeline(&input, -1.0);
        let hr: Vec<f64> = imputed.hours.iter().map(|h| h.features[0]).collect();
        assert_eq!(hr, vec![80.0, 80.0, 80.0, 80.0, 90.0, 90.0]);
    }

    #[test]
    fn never_measured_becomes_sentinel() {
        let input = timeline(&[None, None, None], &[Some(0.0); 3]);
        let imputed = impute_timeline(&input, -1.0);
        for hour in &imputed.hours {
            assert!(hour.features.iter().all(|value| *value == -1.0));
        }
    }

    #[test]
    fn measured_zero_is_kept() {
        let input = timeline(&[Some(0.0), None], &[Some(0.0); 2]);
        let imputed = impute_timeline(&input, -1.0);
        assert_eq!(imputed.hours[1].features[0], 0.0);
    }

    #[test]
    fn labels_fill_without_sentinel() {
        let input = timeline(&[Some(1.0); 4], &[None, Some(0.0), None, Some(1.0)]);
        let imputed = impute_timeline(&input, -1.0);
        let labels: Vec<Option<f64>> = imputed.hours.iter().map(|h| h.onset_label).collect();
        assert_eq!(labels, vec![Some(0.0), Some(0.0), Some(0.0), Some(1.0)]);

        let unlabeled = timeline(&[Some(1.0); 2], &[None, None]);
        let imputed = impute_timeline(&unlabeled, -1.0);
        assert!(imputed.hours.iter().all(|h| h.onset_label.is_none()));
    }

    #[test]
    fn empty_timeline() {
        let imputed = impute_timeline(&timeline(&[], &[]), -1.0);
        assert!(imputed.is_empty());
    }
}
