//! Error types for arpmitm

use thiserror::Error;

/// Result type alias for arpmitm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for arpmitm
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Attack configuration error (bad victim IP, no usable interface, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// MAC resolution failed for one of the attacked parties
    #[error("Could not resolve the MAC address of the {party} ({ip})")]
    Resolution { party: &'static str, ip: String },

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface error
    #[error("Interface error: {0}")]
    Interface(String),

    /// Raw socket could not be opened for lack of privileges
    #[error("Insufficient privileges: {0}")]
    InsufficientPrivileges(String),

    /// Packet parsing error
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),
}

impl Error {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a resolution error naming the failed party
    pub fn resolution<S: Into<String>>(party: &'static str, ip: S) -> Self {
        Error::Resolution {
            party,
            ip: ip.into(),
        }
    }
}
