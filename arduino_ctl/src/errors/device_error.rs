use std::error::Error;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Why a command or toggle request failed.
///
/// Stats polling never produces one of these; it degrades to an empty
/// snapshot instead.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceErrorKind {
    /// Connection refused or the host could not be reached.
    Unreachable,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Anything else: non-2xx status, undecodable body, broken transport.
    CommunicationFailure,
}

impl DeviceErrorKind {
    /// Stable identifier, safe to match on or log.
    pub fn code(&self) -> &'static str {
        match self {
            DeviceErrorKind::Unreachable => "unreachable",
            DeviceErrorKind::Timeout => "timeout",
            DeviceErrorKind::CommunicationFailure => "communication_failure",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DeviceErrorKind::Unreachable => "device unreachable - check power/network",
            DeviceErrorKind::Timeout => "request timed out - device not responding",
            DeviceErrorKind::CommunicationFailure => "failed to communicate with device",
        }
    }
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug)]
pub struct DeviceError {
    kind: DeviceErrorKind,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source<E>(kind: DeviceErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> DeviceErrorKind {
        self.kind
    }

    pub fn is_unreachable(&self) -> bool {
        self.kind == DeviceErrorKind::Unreachable
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == DeviceErrorKind::Timeout
    }
}

impl From<DeviceErrorKind> for DeviceError {
    fn from(kind: DeviceErrorKind) -> Self {
        Self::new(kind)
    }
}

impl Error for DeviceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
