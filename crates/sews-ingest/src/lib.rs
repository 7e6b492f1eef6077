//! Sepsis early-warning data ingestion.
//!
//! This crate reads everything the pipeline consumes from disk and writes
//! the assembled corpus back out.
//!
//! # Features
//!
//! - **Patient Discovery**: Recursively find `.psv` patient files
//! - **Patient Loading**: Parse one `|`-separated hourly table into a timeline
//! - **External Datasets**: Load long-format event logs with Polars
//! - **Corpus Persistence**: Write and read the labeled corpus as CSV
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use sews_ingest::{list_patient_files, read_patient_timeline};
//!
//! let files = list_patient_files(Path::new("sepsis_data"))?;
//! let timeline = read_patient_timeline(&files[0], "SepsisLabel")?;
//! ```

mod corpus_io;
mod discovery;
mod error;
mod external;
mod patient;
mod values;

// === Error Types ===
pub use error::{IngestError, Result};

// === Patient Files ===
pub use discovery::{PATIENT_FILE_EXTENSION, list_patient_files};
pub use patient::{patient_id_from_path, read_patient_timeline};

// === External Datasets ===
pub use external::{
    EXTERNAL_ITEM_COLUMN, EXTERNAL_PATIENT_COLUMN, EXTERNAL_TIME_COLUMN, EXTERNAL_VALUE_COLUMN,
    ExternalDataset, LongRecord, long_records_from_frame, read_external_dataset,
};

// === Corpus Persistence ===
pub use corpus_io::{DEFAULT_CORPUS_FILE, read_corpus, write_corpus};

// === Value Helpers ===
pub use values::{InvalidNumber, format_numeric, parse_cell};
