//! Error types for client, port, and connection operations.

use thiserror::Error;

/// Errors returned by registry, graph, and client operations.
///
/// `ConnectionExists` and `ConnectionNotFound` are the expected outcomes of
/// idempotent connect/disconnect patterns; see [`Error::is_benign`]. Every other
/// kind is a typed failure the caller has to handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A client name, port name, or alias broke the naming rules.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// The name is already taken (client name server-wide, port name per client).
    #[error("name already in use: {0}")]
    NameConflict(String),

    /// The client is closed or the server shut it down.
    #[error("client is closed")]
    ClientClosed,

    /// The calling client tried to mutate a port owned by another client.
    #[error("port '{port}' is not owned by client '{client}'")]
    NotOwner {
        /// Full name of the port.
        port: String,
        /// Name of the calling client.
        client: String,
    },

    /// The requested port does not exist (never did, or was unregistered).
    #[error("port not found: {0}")]
    PortNotFound(String),

    /// The two ports are already connected.
    #[error("ports '{from}' and '{to}' are already connected")]
    ConnectionExists {
        /// Full name of the output port.
        from: String,
        /// Full name of the input port.
        to: String,
    },

    /// The two ports are not connected.
    #[error("ports '{from}' and '{to}' are not connected")]
    ConnectionNotFound {
        /// Full name of the output port.
        from: String,
        /// Full name of the input port.
        to: String,
    },

    /// The ports carry different data types.
    #[error("cannot connect '{from}' to '{to}': port types differ")]
    IncompatibleTypes {
        /// Full name of the source port.
        from: String,
        /// Full name of the sink port.
        to: String,
    },

    /// The connection does not run from an output to an input.
    #[error("cannot connect '{from}' to '{to}': connections run from an output to an input")]
    IncompatibleDirections {
        /// Full name of the source port.
        from: String,
        /// Full name of the sink port.
        to: String,
    },

    /// A port reached the configured maximum number of connections.
    #[error("port '{port}' already has the maximum of {limit} connections")]
    ConnectionLimit {
        /// Full name of the saturated port.
        port: String,
        /// The configured limit.
        limit: usize,
    },

    /// Every alias slot of the port is in use.
    #[error("port '{port}' already has the maximum of {limit} aliases")]
    AliasLimit {
        /// Full name of the port.
        port: String,
        /// The configured limit.
        limit: usize,
    },

    /// The alias is not assigned to the port.
    #[error("port '{port}' has no alias '{alias}'")]
    AliasNotFound {
        /// Full name of the port.
        port: String,
        /// The alias that was not found.
        alias: String,
    },

    /// A port filter pattern is not a valid regular expression.
    #[error("invalid port pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// The client is already activated.
    #[error("client is already active")]
    AlreadyActive,

    /// The server cannot be reached or has shut down.
    #[error("server unavailable")]
    ServerUnavailable,

    /// The notification thread for a client could not be started.
    #[error("failed to spawn notification thread: {0}")]
    ThreadSpawn(String),
}

impl Error {
    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Returns `true` for the outcomes of idempotent connect/disconnect calls.
    ///
    /// ```rust
    /// use patchbay_core::Error;
    ///
    /// let err = Error::ConnectionExists {
    ///     from: "a:out".to_string(),
    ///     to: "b:in".to_string(),
    /// };
    /// assert!(err.is_benign());
    /// assert!(!Error::ClientClosed.is_benign());
    /// ```
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Error::ConnectionExists { .. } | Error::ConnectionNotFound { .. }
        )
    }
}

/// Convenience result type for patchbay operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_name_display() {
        let err = Error::invalid_name("a:b", "contains the separator");
        assert_eq!(err.to_string(), "invalid name 'a:b': contains the separator");
    }

    #[test]
    fn connection_errors_are_benign() {
        let exists = Error::ConnectionExists {
            from: "a:out".into(),
            to: "b:in".into(),
        };
        let missing = Error::ConnectionNotFound {
            from: "a:out".into(),
            to: "b:in".into(),
        };
        assert!(exists.is_benign());
        assert!(missing.is_benign());
    }

    #[test]
    fn other_errors_are_not_benign() {
        let errors = [
            Error::ClientClosed,
            Error::AlreadyActive,
            Error::ServerUnavailable,
            Error::NameConflict("x".into()),
            Error::PortNotFound("x:y".into()),
            Error::IncompatibleTypes {
                from: "a:out".into(),
                to: "b:in".into(),
            },
        ];
        for err in errors {
            assert!(!err.is_benign(), "{err} should not be benign");
        }
    }

    #[test]
    fn directions_display_names_both_ports() {
        let err = Error::IncompatibleDirections {
            from: "A:in1".into(),
            to: "B:out1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("A:in1"), "got: {msg}");
        assert!(msg.contains("B:out1"), "got: {msg}");
    }
}
