use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Table {0} is empty or could not be decoded")]
    EmptyTable(String),

    #[error("No user record found for id: {0}")]
    UserNotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Persistence error for {key}: {details}")]
    PersistenceError { key: String, details: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecommenderError>;
