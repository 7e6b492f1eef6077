//! Feature schema normalization for external datasets.
//!
//! An external long-format log is pivoted to one row per
//! (patient, timestamp) and one column per measurement code. Known codes
//! are renamed onto canonical features, unknown codes are dropped, and
//! every canonical feature the source never provided is filled with the
//! sentinel. The result always has exactly the classifier's shape.

use std::collections::BTreeMap;

use sews_ingest::LongRecord;
use sews_model::{FEATURE_COUNT, FEATURES, FeatureVector, ModelError, feature_index};

/// External measurement codes that map onto canonical features.
const DEFAULT_ITEM_CODES: [(&str, &str); 5] = [
    ("220045", "HR"),
    ("220047", "O2Sat"),
    ("223761", "Temp"),
    ("220179", "SBP"),
    ("220210", "Resp"),
];

/// Lookup from external measurement codes to canonical feature indices.
///
/// Canonical feature names resolve to themselves, so an already-canonical
/// table passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLookup {
    codes: BTreeMap<String, usize>,
}

impl Default for ItemLookup {
    fn default() -> Self {
        let codes = DEFAULT_ITEM_CODES
            .iter()
            .filter_map(|(code, feature)| Some(((*code).to_string(), feature_index(feature)?)))
            .collect();
        Self { codes }
    }
}

impl ItemLookup {
    /// Adds or replaces code mappings. Target names must be canonical.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self, ModelError> {
        for (code, feature) in overrides {
            let index =
                feature_index(feature).ok_or_else(|| ModelError::UnknownFeature(feature.clone()))?;
            self.codes.insert(normalize_code(code), index);
        }
        Ok(self)
    }

    /// Canonical feature index for a column or code, if any.
    pub fn resolve(&self, column: &str) -> Option<usize> {
        self.codes
            .get(&normalize_code(column))
            .copied()
            .or_else(|| feature_index(column))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Identifies one wide row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub patient: String,
    pub timestamp: String,
}

impl RowKey {
    pub fn new(patient: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            patient: patient.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Pivoted measurements keyed by (patient, timestamp), columns in source
/// naming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub keys: Vec<RowKey>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Pivots long records to wide form.
///
/// Duplicate measurements for the same key and code are averaged. Missing
/// values do not contribute; a key or code with no numeric value at all
/// does not produce a row or column.
pub fn pivot_long(records: &[LongRecord]) -> WideTable {
    let mut cells: BTreeMap<RowKey, BTreeMap<&str, Mean>> = BTreeMap::new();
    for record in records {
        let Some(value) = record.value else {
            continue;
        };
        cells
            .entry(RowKey::new(record.patient.as_str(), record.timestamp.as_str()))
            .or_default()
            .entry(record.code.as_str())
            .or_default()
            .push(value);
    }

    let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for row in cells.values() {
        for code in row.keys() {
            columns.entry((*code).to_string()).or_default();
        }
    }
    let mut keys = Vec::with_capacity(cells.len());
    for (key, row) in cells {
        for (code, column) in columns.iter_mut() {
            column.push(row.get(code.as_str()).and_then(|mean| mean.value()));
        }
        keys.push(key);
    }

    WideTable { keys, columns }
}

/// What normalization changed about a source schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Canonical features the source never provided.
    pub missing_features: Vec<&'static str>,
    /// Source columns with no canonical counterpart.
    pub dropped_codes: Vec<String>,
    /// Source columns renamed onto a canonical feature.
    pub renamed: Vec<(String, &'static str)>,
}

impl SchemaDiff {
    pub fn mapped_count(&self) -> usize {
        FEATURE_COUNT - self.missing_features.len()
    }
}

/// Rows in canonical feature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub keys: Vec<RowKey>,
    pub rows: Vec<FeatureVector>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wide view with one column per canonical feature.
    pub fn to_wide(&self) -> WideTable {
        let columns = FEATURES
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let values = self.rows.iter().map(|row| Some(row[index])).collect();
                ((*name).to_string(), values)
            })
            .collect();
        WideTable {
            keys: self.keys.clone(),
            columns,
        }
    }
}

/// Maps a wide table onto the canonical feature vector.
///
/// When several source columns resolve to the same feature, the first
/// non-missing value in column order wins. Cells still missing afterwards
/// take `sentinel`.
pub fn normalize_wide(
    table: &WideTable,
    lookup: &ItemLookup,
    sentinel: f64,
) -> (NormalizedTable, SchemaDiff) {
    let mut diff = SchemaDiff::default();
    let mut sources: Vec<(usize, &Vec<Option<f64>>)> = Vec::new();
    let mut provided = [false; FEATURE_COUNT];

    for (name, values) in &table.columns {
        match lookup.resolve(name) {
            Some(index) => {
                provided[index] = true;
                if name.as_str() != FEATURES[index] {
                    diff.renamed.push((name.clone(), FEATURES[index]));
                }
                sources.push((index, values));
            }
            None => diff.dropped_codes.push(name.clone()),
        }
    }
    diff.missing_features = FEATURES
        .iter()
        .zip(provided)
        .filter(|(_, provided)| !provided)
        .map(|(name, _)| *name)
        .collect();

    let rows = (0..table.keys.len())
        .map(|row| {
            let mut cells: [Option<f64>; FEATURE_COUNT] = [None; FEATURE_COUNT];
            for (index, values) in &sources {
                if cells[*index].is_none() {
                    cells[*index] = values.get(row).copied().flatten();
                }
            }
            cells.map(|cell| cell.unwrap_or(sentinel))
        })
        .collect();

    (
        NormalizedTable {
            keys: table.keys.clone(),
            rows,
        },
        diff,
    )
}

/// Pivots and normalizes an external long-format log.
pub fn normalize_long(
    records: &[LongRecord],
    lookup: &ItemLookup,
    sentinel: f64,
) -> (NormalizedTable, SchemaDiff) {
    let _span = tracing::info_span!("normalize", records = records.len()).entered();
    let wide = pivot_long(records);
    let (table, diff) = normalize_wide(&wide, lookup, sentinel);
    tracing::info!(
        rows = table.len(),
        mapped = diff.mapped_count(),
        defaulted = diff.missing_features.len(),
        dropped_codes = diff.dropped_codes.len(),
        "normalized external schema"
    );
    (table, diff)
}
