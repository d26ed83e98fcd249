use thiserror::Error;

#[derive(Debug, Error)]
pub enum LandCreditError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<serde_json::Error> for LandCreditError {
    fn from(e: serde_json::Error) -> Self {
        LandCreditError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for LandCreditError {
    fn from(e: csv::Error) -> Self {
        LandCreditError::ExportError(e.to_string())
    }
}
