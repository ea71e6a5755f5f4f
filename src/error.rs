use std::io;

use thiserror::Error;

/// A construct the grammar accepted but the active specification forbids.
///
/// Deviations are distinct from syntax errors: the line still produced a
/// parse tree, it just isn't RFC-compliant. Each kind can be allow-listed
/// on the builder, in which case parsing continues with a best-effort
/// value (or the nil policy) instead of failing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Deviation {
    #[error("PRI missing")]
    MissingPri,
    #[error("version token missing")]
    MissingVersion,
    #[error("structured data block missing")]
    MissingStructuredData,
    #[error("malformed timestamp")]
    MalformedTimestamp,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("unexpected eof")]
    UnexpectedEndOfInput,
    #[error("expected {0:?}")]
    ExpectedChar(char),
    #[error("invalid priority value")]
    BadPri,
    #[error("invalid octet count")]
    BadOctetCount,
}

/// Raw syntax failure reported by a grammar entry point, before the
/// parser attaches the offending line text.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{kind} at byte {position}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: usize,
}

/// Failure raised by a builder operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{0}")]
    Deviation(Deviation),
    #[error("{operation} called in {state} state")]
    Lifecycle {
        operation: &'static str,
        state: &'static str,
    },
}

/// Either failure a grammar drive can produce: the grammar itself gave up,
/// or the event sink (usually a builder) rejected an event.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DriveError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

#[derive(Debug, Error)]
pub enum Error {
    /// The line was empty (or nothing but a BOM and line terminator).
    #[error("line cannot be empty")]
    EmptyLine,

    /// The grammar could not derive a parse tree for the line.
    #[error("cannot parse {line:?}: {source}")]
    Parse {
        line: String,
        #[source]
        source: SyntaxError,
    },

    /// The grammar derived a tree but a specification rule was violated
    /// and the deviation was not allow-listed.
    #[error("deviation in {line:?}: {deviation}")]
    Deviation { line: String, deviation: Deviation },

    /// A builder was driven out of lifecycle order.
    #[error("builder misuse: {0}")]
    Builder(#[from] BuildError),

    /// Two field keys were configured to the same output key string.
    #[error("output key {key:?} is mapped by more than one field")]
    DuplicateOutputKey { key: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify a grammar drive failure against the line that caused it.
    ///
    /// Every failed line maps to exactly one error value, which is what
    /// lets the streaming APIs isolate failures per line.
    pub(crate) fn classify(line: &str, err: DriveError) -> Error {
        match err {
            DriveError::Syntax(source) => Error::Parse {
                line: line.to_owned(),
                source,
            },
            DriveError::Build(BuildError::Deviation(deviation)) => Error::Deviation {
                line: line.to_owned(),
                deviation,
            },
            DriveError::Build(err) => Error::Builder(err),
        }
    }

    pub(crate) fn classify_build(line: &str, err: BuildError) -> Error {
        Error::classify(line, DriveError::Build(err))
    }
}
