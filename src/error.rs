use std::error::Error as ErrorTrait;
use std::fmt::Display;
use std::io;

///
/// Contains information about an error occurence
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    /// The type of this error
    pub kind: ErrorKind,
    /// Some errors come with more context
    pub context: Option<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error {
            kind,
            context: None,
        }
    }

    pub(crate) fn new_with_context(kind: ErrorKind, context: impl Display) -> Error {
        Error {
            kind,
            context: Some(context.to_string()),
        }
    }

    pub(crate) fn assertion(message: impl Display) -> Error {
        Self::new_with_context(ErrorKind::Assertion, message)
    }

    pub(crate) fn configuration(message: impl Display) -> Error {
        Self::new_with_context(ErrorKind::Configuration, message)
    }

    ///
    /// Whether this error reports an expected-vs-actual mismatch rather than
    /// a misconfiguration or an I/O failure.
    ///
    pub fn is_assertion(&self) -> bool {
        self.kind == ErrorKind::Assertion
    }

    ///
    /// The context message, or the kind description when there is none.
    ///
    pub fn message(&self) -> &str {
        self.context
            .as_deref()
            .unwrap_or_else(|| self.kind.description())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.context {
            Some(ref context) => write!(f, "{}: {}", self.kind.description(), context),
            None => f.write_str(self.kind.description()),
        }
    }
}

impl ErrorTrait for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::new_with_context(ErrorKind::Io, err)
    }
}

///
/// The type of an error
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A request did not meet an expectation, or the expectations were not met
    Assertion,
    /// The expectations or responses were set up incorrectly
    Configuration,
    /// An I/O failure raised by a matcher, a response creator or a transport
    Io,
    /// Could not deliver a response
    ResponseFailure,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::Assertion => "assertion failed",
            ErrorKind::Configuration => "invalid configuration",
            ErrorKind::Io => "I/O failure",
            ErrorKind::ResponseFailure => "could not deliver a response",
        }
    }
}
