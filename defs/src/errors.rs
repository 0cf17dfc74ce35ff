use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to load monitor definition {0}")]
    Config(String),

    #[error("No discovery client for service: {0}")]
    UnsupportedService(String),

    #[error("Could not resolve {0}")]
    Resolution(String),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}
