//! Ingestion of simulation-run artifacts into a canonical-named whiteboard.
//!
//! For a job (and its iterations) the run log, design document and hourly
//! operations tables are fetched from the local cache or the results
//! service, their names normalized, and every series summarized.

pub mod config;
pub mod design;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod names;
pub mod pipeline;
pub mod run_log;
pub mod series;
pub mod stats;
pub mod table;
pub mod whiteboard;

pub use error::{FailureKind, IngestError};
pub use pipeline::{IngestReport, Ingestor};
pub use whiteboard::{Value, Whiteboard};
