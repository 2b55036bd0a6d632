use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] sb_config::ConfigError),

    #[error("{0}")]
    Core(#[from] sb_core::CoreError),

    #[error("Failed to prepare log directory {path}: {source}")]
    LogDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger error: {message}")]
    Logger { message: String },

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
