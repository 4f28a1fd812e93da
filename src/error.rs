use std::io;

use thiserror::Error;

/// Errors returned by the codec.
#[derive(Debug, Error)]
pub enum Error {
    /// `pop()` on an empty priority heap.
    #[error("pop on empty heap")]
    EmptyHeap,
    /// No symbols to build a code from.
    #[error("empty alphabet")]
    EmptyAlphabet,
    /// A byte has no entry in the code table used for encoding.
    #[error("symbol {0:#04x} not in code table")]
    UnknownSymbol(u8),
    /// A code table assigns a zero-length code, which no decoder can match.
    #[error("symbol {0:#04x} has an empty code")]
    EmptyCode(u8),
    /// Two symbols were assigned the same code.
    #[error("symbols {first:#04x} and {second:#04x} share a code")]
    DuplicateCode { first: u8, second: u8 },
    /// The table section of a compressed file is inconsistent.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),
    /// Input ended before every declared symbol was decoded.
    #[error("truncated stream")]
    TruncatedStream,
    /// The packed bits contain a pattern that matches no code.
    #[error("corrupt stream: {bits} bits match no code")]
    CorruptStream { bits: usize },
    /// Summing two node weights overflowed.
    #[error("weight overflow")]
    WeightOverflow,
    /// The second pass over the input saw a different number of bytes.
    #[error("input changed between passes: expected {expected} bytes, got {actual}")]
    InputChanged { expected: u64, actual: u64 },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true for internal invariant violations, which indicate a
    /// defect in the codec rather than bad input.
    pub fn is_bug(&self) -> bool {
        matches!(self, Error::EmptyHeap | Error::DuplicateCode { .. })
    }

    /// Maps an unexpected end of input to [`Error::TruncatedStream`].
    pub(crate) fn from_read(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedStream
        } else {
            Error::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
