use crate::resp::{RespError, RespValue};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TrolError {
    #[error("invalid identity {0:?}: {1}")]
    InvalidIdentity(String, &'static str),

    #[error("invalid name {0:?}: {1}")]
    InvalidName(String, &'static str),

    #[error("malformed key {0:?}")]
    MalformedKey(String),

    #[error("field '{field}' is not declared on '{holder}'")]
    UndeclaredField { holder: String, field: String },

    #[error("field '{field}' is declared twice on '{holder}'")]
    DuplicateField { holder: String, field: String },

    #[error("model '{0}' is declared twice")]
    DuplicateModel(String),

    #[error("cannot coerce {value:?} for field '{field}': {reason}")]
    Coercion {
        field: String,
        value: String,
        reason: String,
    },

    /// An error reply from the server, message kept verbatim.
    #[error("{0}")]
    Server(String),

    #[error("unexpected reply to {command}: {reply:?}")]
    UnexpectedReply { command: String, reply: RespValue },

    #[error("protocol error: {0}")]
    Protocol(#[from] RespError),

    #[error("connection closed by server")]
    ConnectionClosed,

    /// An earlier command was interrupted before its reply was read, so the
    /// stream can no longer be matched to requests.
    #[error("connection to {0} is out of sync and must be reopened")]
    ConnectionBroken(String),

    #[error("no reply from server within {0:?}")]
    ResponseTimeout(Duration),

    #[error("could not acquire lock '{key}' within {waited:?}")]
    LockTimeout { key: String, waited: Duration },

    #[error("lock '{0}' is held by another owner")]
    LockContended(String),

    #[error("lock '{0}' is not held by this token")]
    LockNotOwned(String),

    #[error("acquisition of lock '{0}' was cancelled")]
    LockCancelled(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrolError {
    /// Lock failures that are not caused by the transport.
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            TrolError::LockTimeout { .. }
                | TrolError::LockContended(_)
                | TrolError::LockNotOwned(_)
                | TrolError::LockCancelled(_)
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TrolError::Io(_)
                | TrolError::Protocol(_)
                | TrolError::ConnectionClosed
                | TrolError::ConnectionBroken(_)
                | TrolError::ResponseTimeout(_)
        )
    }
}

pub type TrolResult<T> = Result<T, TrolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_failures_are_not_transport_errors() {
        let timeout = TrolError::LockTimeout {
            key: "Brewery:frmt:mutex".to_string(),
            waited: Duration::from_millis(250),
        };
        assert!(timeout.is_lock_failure());
        assert!(!timeout.is_transport());

        let io = TrolError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert!(io.is_transport());
        assert!(!io.is_lock_failure());
    }

    #[test]
    fn test_coercion_message_names_field_and_value() {
        let err = TrolError::Coercion {
            field: "abv".to_string(),
            value: "strong".to_string(),
            reason: "invalid float literal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot coerce \"strong\" for field 'abv': invalid float literal"
        );
    }
}
