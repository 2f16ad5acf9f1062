use std::{fmt, io};

/// Convenience alias for results returned by this crate
pub type Result<T> = std::result::Result<T, Error>;

/// A type containing error variants that may arise at the transport and I/O boundary
///
/// The window aggregators themselves never fail; every variant here is fatal for the
/// consumer or validator that raised it.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a sink or log file failed
    Io(io::Error),
    /// A transport payload was neither an integer nor the end-of-stream sentinel
    MalformedPayload {
        /// The offending payload
        payload: String,
    },
    /// An output log line could not be parsed
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },
    /// A logged aggregate differs from the recomputed one
    Mismatch {
        /// 1-based line number
        line: usize,
        /// The aggregate name (`sum` or `median`)
        kind: &'static str,
        /// The recomputed aggregate
        expected: String,
        /// The logged aggregate
        actual: String,
    },
    /// A timestamp cannot be represented as nanoseconds since unix epoch
    TimestampOutOfRange {
        /// The offending timestamp in RFC3339
        timestamp: String,
    },
    /// The transport dropped a subscription before the end-of-stream sentinel
    Disconnected {
        /// The topic that lost its publisher
        topic: String,
    },
    /// A consumer task panicked or was cancelled
    Join(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::MalformedPayload { payload } => {
                write!(f, "unexpected payload {payload:?}, expected an integer")
            }
            Error::MalformedLine { line, reason } => write!(f, "at line {line}, {reason}"),
            Error::Mismatch {
                line,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "at line {line}, expected to have {kind} {expected}, but got {actual}"
            ),
            Error::TimestampOutOfRange { timestamp } => {
                write!(f, "timestamp {timestamp} is outside the nanosecond range")
            }
            Error::Disconnected { topic } => {
                write!(f, "topic {topic} disconnected before end of stream")
            }
            Error::Join(reason) => write!(f, "consumer task failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Join(err.to_string())
    }
}

impl Error {
    /// Returns `true` if the error represents [Error::Mismatch]
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Error::Mismatch { .. })
    }
    /// Returns `true` if the error represents [Error::MalformedLine]
    pub fn is_malformed_line(&self) -> bool {
        matches!(self, Error::MalformedLine { .. })
    }
    /// Returns the 1-based line number for validator errors
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedLine { line, .. } | Error::Mismatch { line, .. } => Some(*line),
            _ => None,
        }
    }
}
