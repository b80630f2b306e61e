use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable \"{0}\"")]
    MissingEnvVar(&'static str),

    #[error("Environment variable \"{name}\" is not a non-negative integer: {value:?}")]
    NotAnInteger { name: &'static str, value: String },

    #[error("Environment variable \"{name}\" must be a positive integer: {value:?}")]
    NotPositive { name: &'static str, value: String },

    #[error("Environment variable \"{name}\" contains an empty volume id at position {position}")]
    EmptyVolumeId { name: &'static str, position: usize },

    #[error("Environment variable \"{name}\" is not an http(s) URL: {value:?}")]
    InvalidUrl { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
