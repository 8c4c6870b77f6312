use std::fmt;
use std::ops::Deref;

use abscissa_core::error::{BoxError, Context};

use crate::components::{claim::ClaimError, convert::ConvertError};

macro_rules! wfl {
    ($f:ident, $message_id:literal) => {
        write!($f, "{}", $crate::fl!($message_id))
    };
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Generic,
    Init,
    Convert(ConvertError),
    Claim(ClaimError),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Generic => wfl!(f, "err-kind-generic"),
            ErrorKind::Init => wfl!(f, "err-kind-init"),
            ErrorKind::Convert(e) => fmt::Display::fmt(e, f),
            ErrorKind::Claim(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for ErrorKind {}

impl ErrorKind {
    /// Creates an error context from this error.
    pub(crate) fn context(self, source: impl Into<BoxError>) -> Context<ErrorKind> {
        Context::new(self, Some(source.into()))
    }
}

/// Error type
#[derive(Debug)]
pub(crate) struct Error(Box<Context<ErrorKind>>);

impl Deref for Error {
    type Target = Context<ErrorKind>;

    fn deref(&self) -> &Context<ErrorKind> {
        &self.0
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0)?;
        writeln!(f)?;
        write!(f, "[ {} ]", crate::fl!("err-ux-rerun"))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Context::new(kind, None).into()
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(context: Context<ErrorKind>) -> Self {
        Error(Box::new(context))
    }
}

impl From<ConvertError> for Error {
    fn from(e: ConvertError) -> Self {
        ErrorKind::Convert(e).into()
    }
}

impl From<ClaimError> for Error {
    fn from(e: ClaimError) -> Self {
        ErrorKind::Claim(e).into()
    }
}
