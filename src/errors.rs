use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Unknown browser string '{0}'")]
    UnknownBrowser(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No local browser support for '{0}'")]
    UnsupportedBrowser(String),

    #[error("No grid configuration for '{0}'")]
    UnsupportedGridBrowser(String),

    #[error("The app url was not yet set in the session")]
    AppUrlNotSet,

    #[error("The driver is not yet loaded")]
    DriverNotLoaded,

    #[error("This is not a SauceLabs session; cannot upload a result")]
    NotSauceSession,

    #[error("The remote session id was never captured for this session")]
    SessionIdMissing,

    #[error("Driver launch failed: {0}")]
    LaunchFailed(String),

    #[error("WebDriver command failed: {0}")]
    WebDriver(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
