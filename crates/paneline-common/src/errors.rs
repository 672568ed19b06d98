use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failure reported by the host platform. The code/message pair is opaque
/// to the dialog core and surfaced to callers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("platform error {code}: {message}")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PanelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("dialog error: {0}")]
    Dialog(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("dialog.width_percent = 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: dialog.width_percent = 0"
        );
    }

    #[test]
    fn platform_error_display() {
        let err = PlatformError::new(12007, "a dialog is already open");
        assert_eq!(
            err.to_string(),
            "platform error 12007: a dialog is already open"
        );
    }

    #[test]
    fn paneline_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: PanelineError = config_err.into();
        assert!(matches!(err, PanelineError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn paneline_error_from_platform() {
        let err: PanelineError = PlatformError::new(12002, "page not found").into();
        assert!(matches!(err, PanelineError::Platform(_)));
        assert!(err.to_string().contains("page not found"));
    }

    #[test]
    fn paneline_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PanelineError = io_err.into();
        assert!(matches!(err, PanelineError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn paneline_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PanelineError = json_err.into();
        assert!(matches!(err, PanelineError::Json(_)));
    }

    #[test]
    fn paneline_error_other_variants() {
        let err = PanelineError::Dialog("already open".into());
        assert_eq!(err.to_string(), "dialog error: already open");

        let err = PanelineError::Other("something went wrong".into());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
