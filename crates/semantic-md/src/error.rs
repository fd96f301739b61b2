use core::fmt;
use std::{borrow::Cow, ops::Deref};

/// The kind of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input markup could not be read or parsed.
    Parse,
    /// An option value was not recognized.
    InvalidConfiguration,
    /// The input was empty.
    EmptyInput,
}

/// An error that can occur during the conversion process.
#[derive(Clone)]
pub struct Error(Box<Repr>);

#[derive(Clone)]
struct Repr {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl Error {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        Error(Box::new(Repr {
            kind,
            msg: msg.into(),
        }))
    }

    /// A parse failure.
    pub fn parse(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Parse, msg)
    }

    /// An unrecognized option value.
    pub fn invalid_configuration(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, msg)
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }

    /// The message of this error, without the kind prefix.
    pub fn message(&self) -> &str {
        &self.0.msg
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self.0.deref();
        match repr.kind {
            ErrorKind::Parse => write!(f, "failed to parse HTML: {}", repr.msg),
            ErrorKind::InvalidConfiguration => {
                write!(f, "invalid conversion options: {}", repr.msg)
            }
            ErrorKind::EmptyInput => write!(f, "{}", repr.msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::parse(e.to_string())
    }
}
