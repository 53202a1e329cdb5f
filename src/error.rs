use thiserror::Error;

/// Errors that can occur while computing the environmental performance index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Fit failure: {0}")]
    FitFailure(String),

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Aggregation error: {0}")]
    AggregationError(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<IndexError>,
    },
}

impl IndexError {
    /// Wrap an error with the name of the pipeline stage that produced it.
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        IndexError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any stage wrappers.
    pub fn root(&self) -> &IndexError {
        match self {
            IndexError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
