use std::fmt;

/// Error type for the catalog.
#[derive(PartialEq, Eq)]
pub struct Error {
    repr: ErrorRepr,
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition failed before any store call was made.
    Precondition,
    /// The submitted fields are invalid.
    Validation,
    /// The product does not exist.
    NotFound,
    /// The store reported a failure.
    Store,
    /// No handler is registered for the request.
    HandlerNotFound,
    /// Another mutation is still in flight.
    Busy,
}

impl ErrorKind {
    /// Returns the description of the error kind.
    pub fn as_str(&self) -> &str {
        match *self {
            ErrorKind::Precondition => "precondition failed",
            ErrorKind::Validation => "invalid product",
            ErrorKind::NotFound => "product not found",
            ErrorKind::Store => "store error",
            ErrorKind::HandlerNotFound => "handler not found",
            ErrorKind::Busy => "another operation is in progress",
        }
    }
}

#[derive(PartialEq, Eq)]
enum ErrorRepr {
    /// An error with a kind.
    Kind(ErrorKind),
    /// An error with a description.
    WithDescription(ErrorKind, String),
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, description: S) -> Error {
        Error {
            repr: ErrorRepr::WithDescription(kind, description.into()),
        }
    }

    pub fn precondition<S: Into<String>>(description: S) -> Error {
        Error::new(ErrorKind::Precondition, description)
    }

    pub fn validation<S: Into<String>>(description: S) -> Error {
        Error::new(ErrorKind::Validation, description)
    }

    pub fn store<S: Into<String>>(description: S) -> Error {
        Error::new(ErrorKind::Store, description)
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Kind(kind) => kind,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }

    /// Returns the description attached to this error, if any.
    pub fn description(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::Kind(_) => None,
            ErrorRepr::WithDescription(_, ref description) => Some(description),
        }
    }

    /// Whether the error was raised before reaching the store.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Precondition | ErrorKind::Validation | ErrorKind::Busy
        )
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            repr: ErrorRepr::Kind(kind),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::store(format!("malformed product record: {}", err))
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Error {
        Error::store(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Error {
        match err {
            sqlx::Error::RowNotFound => Error::from(ErrorKind::NotFound),
            other => Error::store(other.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            ErrorRepr::Kind(ref kind) => {
                write!(f, "{}", kind.as_str())
            }
            ErrorRepr::WithDescription(ref kind, ref description) => match *kind {
                ErrorKind::Precondition | ErrorKind::Validation => {
                    write!(f, "{}", description)
                }
                _ => {
                    write!(f, "{}: {}", kind.as_str(), description)
                }
            },
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}
