use std::fmt;

/// Error kinds from spec §7. `Io`/`Parse` are the ambient additions a
/// crate boundary needs; the rest mirror the driver's own failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    /// Schema/arity/type mismatch, malformed tea syntax, impossible merge.
    BadArgument,
    /// Operation attempted before the file was opened.
    FileNotOpen,
    /// Unsupported feature (reopen, `NOT IN (neighbor ...)`).
    NotSupported,
    /// Tea-parse failure; `context` carries the offending substring.
    WrongParameter,
    /// Update/insert attempted on a read-only file.
    IllegalFileAccess,
    /// Buffer allocation failure; usually retryable at a higher layer.
    MemoryExhaust,
    /// Corrupted physical page discovered during attach.
    BadDataPage,
    /// Invariant violation the code cannot reason about; fatal.
    Unexpected,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error { kind: ErrorKind::Io, context: err.to_string() }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error { kind: ErrorKind::Parse, context: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
