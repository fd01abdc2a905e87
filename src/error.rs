use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv error in {path}: {message}")]
    Csv { path: String, message: String },
    #[error("no dish shards found under {0}")]
    NoShards(String),
}
