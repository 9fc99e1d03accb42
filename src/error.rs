//! Failure taxonomy for ingestion.
//!
//! Every failure site classifies into one of four kinds. Only [`IngestError::Fatal`]
//! crosses the ingestion boundary; the others are logged, collected and skipped.

/// Classification used to decide continue-vs-abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    Schema,
    Fatal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Parse => "parse",
            FailureKind::Schema => "schema",
            FailureKind::Fatal => "fatal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Artifact unreachable at every candidate location
    #[error("{artifact} for job {job} not found at any location")]
    Transport { job: u64, artifact: String },

    /// Payload present but not valid tabular or JSON data
    #[error("cannot parse {artifact}: {reason}")]
    Parse { artifact: String, reason: String },

    /// Expected field or path absent in an otherwise valid document
    #[error("{path}: {reason}")]
    Schema { path: String, reason: String },

    /// Ingestion of the job cannot proceed
    #[error("job {job} aborted: {source}")]
    Fatal {
        job: u64,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    pub fn parse(artifact: &str, reason: impl ToString) -> Self {
        IngestError::Parse {
            artifact: artifact.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        IngestError::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Escalate a failure that leaves the job without an iteration count.
    pub fn fatal(job: u64, cause: IngestError) -> Self {
        IngestError::Fatal {
            job,
            source: Box::new(cause),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::Transport { .. } => FailureKind::Transport,
            IngestError::Parse { .. } => FailureKind::Parse,
            IngestError::Schema { .. } => FailureKind::Schema,
            IngestError::Fatal { .. } => FailureKind::Fatal,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind() == FailureKind::Fatal
    }
}
