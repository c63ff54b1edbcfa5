use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// BSD `sysexits.h` return values used as process exit codes.
pub mod exit {
    pub const EX_OK: u8 = 0;
    pub const EX_DATAERR: u8 = 65;
    pub const EX_NOINPUT: u8 = 66;
    pub const EX_UNAVAILABLE: u8 = 69;
    pub const EX_SOFTWARE: u8 = 70;
    pub const EX_IOERR: u8 = 74;
    pub const EX_CONFIG: u8 = 78;
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Binance API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No data for {0}")]
    NoData(String),

    #[error("Parse float error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => exit::EX_CONFIG,
            Self::Api { .. } | Self::Http(_) => exit::EX_UNAVAILABLE,
            Self::Validation(_) | Self::NoData(_) | Self::ParseFloat(_) | Self::SerdeJson(_) => {
                exit::EX_DATAERR
            }
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => exit::EX_NOINPUT,
            Self::Io(_) | Self::Csv(_) => exit::EX_IOERR,
            Self::UrlParse(_) => exit::EX_SOFTWARE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_ex_config() {
        let err = AppError::Config("API_KEY is not set".into());
        assert_eq!(err.exit_code(), exit::EX_CONFIG);
        assert_eq!(err.to_string(), "Configuration error: API_KEY is not set");
    }

    #[test]
    fn missing_file_maps_to_ex_noinput() {
        let err: AppError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(err.exit_code(), exit::EX_NOINPUT);
        let err: AppError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(err.exit_code(), exit::EX_IOERR);
    }

    #[test]
    fn api_errors_render_code_and_message() {
        let err = AppError::Api {
            code: -1121,
            message: "Invalid symbol.".into(),
        };
        assert_eq!(err.to_string(), "Binance API error -1121: Invalid symbol.");
        assert_eq!(err.exit_code(), exit::EX_UNAVAILABLE);
    }
}
