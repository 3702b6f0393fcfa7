#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unexpected format for {field}: '{value}'")]
    UnexpectedFormat { field: String, value: String },

    #[error("Unrecognized temperature topology (modules: {0})")]
    UnknownTopology(String),
}
