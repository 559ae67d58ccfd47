use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid limiter config: {0}")]
    InvalidLimiterConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
