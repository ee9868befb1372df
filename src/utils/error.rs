use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Grade scale error: {message}")]
    ScaleError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

impl LedgerError {
    /// 儲存層找不到檔案（首次執行時的正常情況）
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LedgerError::IoError(e) => format!("Could not read or write a file: {}", e),
            LedgerError::SerializationError(_) => {
                "Saved what-if data is corrupted and could not be read".to_string()
            }
            LedgerError::CsvError(_) => "Could not write the course table".to_string(),
            LedgerError::ConfigError { message } => format!("Configuration problem: {}", message),
            LedgerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            LedgerError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            LedgerError::ScaleError { message } => format!("Grade scale is invalid: {}", message),
            LedgerError::StorageError { message } => format!("Storage unavailable: {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
