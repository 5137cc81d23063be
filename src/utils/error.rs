use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid input format: {message}")]
    Usage { message: String },

    #[error("Invalid date '{value}': expected yyyymmdd")]
    InvalidDate { value: String },

    #[error("HTTP Error: {code}, {reason}")]
    HttpStatus { code: u16, reason: String, url: String },

    #[error("URL Error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("FTP Error: {0}")]
    FtpError(#[from] suppaftp::FtpError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid filter pattern: {0}")]
    FilterError(#[from] globset::Error),

    #[error("GRIB2 decoding error: {0}")]
    GribError(#[from] grib::GribError),

    #[error("NetCDF error: {0}")]
    NetcdfError(#[from] netcdf::Error),

    #[error("No file in dataset '{dataset_id}' matches filter '{filter}'")]
    NoMatchingFile { dataset_id: String, filter: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Remote,
    Storage,
    Format,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::Usage { .. } | FetchError::InvalidDate { .. } => ErrorCategory::Input,
            FetchError::RequestError(_) | FetchError::FtpError(_) => ErrorCategory::Network,
            FetchError::HttpStatus { .. }
            | FetchError::NoMatchingFile { .. }
            | FetchError::CatalogError { .. } => ErrorCategory::Remote,
            FetchError::IoError(_) => ErrorCategory::Storage,
            FetchError::SerializationError(_)
            | FetchError::GribError(_)
            | FetchError::NetcdfError(_)
            | FetchError::ProcessingError { .. } => ErrorCategory::Format,
            FetchError::FilterError(_)
            | FetchError::ConfigValidationError { .. }
            | FetchError::InvalidConfigValueError { .. }
            | FetchError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Format => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FetchError::Usage { .. } | FetchError::InvalidDate { .. } => {
                "Pass zero, one or two dates in yyyymmdd format".to_string()
            }
            FetchError::HttpStatus { code: 404, .. } => {
                "The product is probably not published yet for this date; try an earlier date"
                    .to_string()
            }
            FetchError::HttpStatus { code: 401, .. } | FetchError::HttpStatus { code: 403, .. } => {
                "Check COPERNICUSMARINE_SERVICE_USERNAME and COPERNICUSMARINE_SERVICE_PASSWORD"
                    .to_string()
            }
            FetchError::HttpStatus { .. } | FetchError::RequestError(_) => {
                "Check the network connection and the service status, then rerun".to_string()
            }
            FetchError::FtpError(_) => {
                "The FTP archive only keeps the last couple of days; check the date".to_string()
            }
            FetchError::NoMatchingFile { .. } => {
                "The dataset has no file for this date yet; check the product's time coverage"
                    .to_string()
            }
            FetchError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            FetchError::CatalogError { .. } | FetchError::SerializationError(_) => {
                "Check product_id and dataset_id against the marine service catalog".to_string()
            }
            FetchError::GribError(_) | FetchError::NetcdfError(_) => {
                "The downloaded file could not be converted; rerun to download it again"
                    .to_string()
            }
            FetchError::ProcessingError { .. } => "Rerun with --verbose for details".to_string(),
            FetchError::FilterError(_)
            | FetchError::ConfigValidationError { .. }
            | FetchError::InvalidConfigValueError { .. }
            | FetchError::MissingConfigError { .. } => {
                "Fix the configuration file and rerun".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FetchError::HttpStatus { code, reason, .. } => {
                format!("HTTP Error: {}, {}", code, reason)
            }
            FetchError::RequestError(e) => format!("URL Error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
