use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyBaseUrl,
    InvalidBaseUrl(String),
    UnsupportedScheme(String),
    ZeroTimeout,
    ZeroPollInterval,
    ZeroFeedbackCapacity,
    InvalidVariable { name: &'static str, value: String },
    UnknownName(String),
    Io(String),
    Parse(String),
    HttpClient(String),
}

impl Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::EmptyBaseUrl => write!(f, "Base URL cannot be empty."),
            ConfigError::InvalidBaseUrl(ref msg) => write!(f, "Invalid base URL: {}", msg),
            ConfigError::UnsupportedScheme(ref scheme) => {
                write!(f, "Unsupported URL scheme '{}', expected http or https", scheme)
            }
            ConfigError::ZeroTimeout => write!(f, "Timeout must be greater than 0."),
            ConfigError::ZeroPollInterval => write!(f, "Poll interval must be greater than 0."),
            ConfigError::ZeroFeedbackCapacity => {
                write!(f, "Feedback capacity must be greater than 0.")
            }
            ConfigError::InvalidVariable { name, ref value } => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
            ConfigError::UnknownName(ref name) => write!(f, "Unknown name: '{}'", name),
            ConfigError::Io(ref msg) => write!(f, "Could not read config: {}", msg),
            ConfigError::Parse(ref msg) => write!(f, "Could not parse config: {}", msg),
            ConfigError::HttpClient(ref msg) => write!(f, "Could not build HTTP client: {}", msg),
        }
    }
}
