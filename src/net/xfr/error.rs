//! Errors of the zone transfer protocol.

use crate::base::name::Name;
use crate::base::wire::ParseError;
use crate::tsig::TsigError;
use std::{error, fmt, io};

//------------ Error ---------------------------------------------------------

/// An error terminating a zone transfer.
///
/// A transfer can fail before the first record arrives or in the middle
/// of the record stream. The error rides on the final envelope of the
/// stream in the latter case, so the records received up to that point
/// remain available alongside it.
#[derive(Debug)]
pub enum Error {
    /// A response carried a different id than the query.
    IdMismatch,

    /// A response sequence did not lead with a SOA record.
    MissingSoa,

    /// A message was signed with a key no secret is configured for.
    UnknownKey(Name),

    /// A TSIG signature failed to validate.
    Tsig(TsigError),

    /// The question is not an AXFR or IXFR question.
    UnsupportedQuestion,

    /// The underlying transport failed.
    Transport(io::Error),

    /// A message could not be parsed.
    Codec(ParseError),
}

//--- From

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Codec(err)
    }
}

impl From<TsigError> for Error {
    fn from(err: TsigError) -> Self {
        Error::Tsig(err)
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IdMismatch => f.write_str("response id mismatch"),
            Error::MissingSoa => f.write_str("missing SOA record"),
            Error::UnknownKey(ref name) => {
                write!(f, "no secret for TSIG key {}", name)
            }
            Error::Tsig(ref err) => write!(f, "TSIG error: {}", err),
            Error::UnsupportedQuestion => {
                f.write_str("question is not a transfer question")
            }
            Error::Transport(ref err) => {
                write!(f, "transport error: {}", err)
            }
            Error::Codec(ref err) => {
                write!(f, "message parse error: {}", err)
            }
        }
    }
}

impl error::Error for Error {}
