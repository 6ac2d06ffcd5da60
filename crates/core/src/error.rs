use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content extraction error: {0}")]
    Extraction(String),

    #[error("Semantic analysis error: {0}")]
    Analysis(String),

    #[error("Strategy model error: {0}")]
    Model(String),

    #[error("Strategy error: {0}")]
    Strategy(String),

    #[error("Audience construction error: {0}")]
    Audience(String),

    #[error("Interest lookup error: {0}")]
    InterestLookup(String),

    #[error("Placement error: {0}")]
    Placement(String),

    #[error("Creative generation error: {0}")]
    Creative(String),

    #[error("Budget allocation error: {0}")]
    Budget(String),

    #[error("Orchestration error: {0}")]
    Orchestration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
