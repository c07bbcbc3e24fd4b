//! Error type shared by every decoder in the crate.
use crate::common::tag::Tag;
use thiserror::Error;

/// Main error type for psdkit operations.
///
/// All variants except [`PsdError::Io`] carry the absolute offset into the
/// input at which the problem was detected.
#[derive(Error, Debug)]
pub enum PsdError {
    /// IO error while reading a document from disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not enough bytes left for a fixed-width read
    #[error("Unexpected end of data at offset {offset}: requested {requested} bytes, {available} available")]
    UnexpectedEof {
        offset: u64,
        requested: usize,
        available: usize,
    },

    /// A magic signature did not match
    #[error("Invalid signature at offset {offset}: expected {expected}, found {found}")]
    InvalidSignature {
        offset: u64,
        expected: Tag,
        found: Tag,
    },

    /// A resource block did not start with `8BIM`
    #[error("Invalid resource signature at offset {offset}: found {found}")]
    InvalidResourceSignature { offset: u64, found: Tag },

    /// The header version is not supported
    #[error("Unsupported document version {version} at offset {offset}")]
    UnsupportedVersion { offset: u64, version: u16 },

    /// A declared section length exceeds the bytes remaining in the input
    #[error("Malformed length at offset {offset}: declared {declared} bytes, {available} available")]
    MalformedLength {
        offset: u64,
        declared: u64,
        available: u64,
    },

    /// A layer rectangle with right < left or bottom < top
    #[error("Invalid layer bounds at offset {offset}: top {top}, left {left}, bottom {bottom}, right {right}")]
    InvalidBounds {
        offset: u64,
        top: i32,
        left: i32,
        bottom: i32,
        right: i32,
    },

    /// A vector mask payload whose length does not hold a whole number of path records
    #[error("Malformed vector mask at offset {offset}: payload length {length} is not 10 + 26n")]
    MalformedVectorMask { offset: u64, length: u64 },

    /// An action descriptor with an unknown value type or excessive nesting
    #[error("Malformed descriptor at offset {offset}: {reason}")]
    MalformedDescriptor { offset: u64, reason: String },

    /// Input rejected by [`crate::ParseOptions::max_input_len`]
    #[error("Input of {len} bytes exceeds the configured limit of {limit} bytes")]
    InputTooLarge { len: u64, limit: u64 },
}

/// Classification of decode failures and recoverable anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    UnexpectedEof,
    InvalidSignature,
    InvalidResourceSignature,
    UnsupportedVersion,
    MalformedLength,
    InvalidBounds,
    MalformedVectorMask,
    MalformedDescriptor,
    InputTooLarge,
    /// Folder markers left open at the end of the layer list. Never returned
    /// as an error; the tree builder closes them implicitly.
    UnbalancedFolderMarkers,
}

impl PsdError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PsdError::Io(_) => ErrorKind::Io,
            PsdError::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            PsdError::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            PsdError::InvalidResourceSignature { .. } => ErrorKind::InvalidResourceSignature,
            PsdError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            PsdError::MalformedLength { .. } => ErrorKind::MalformedLength,
            PsdError::InvalidBounds { .. } => ErrorKind::InvalidBounds,
            PsdError::MalformedVectorMask { .. } => ErrorKind::MalformedVectorMask,
            PsdError::MalformedDescriptor { .. } => ErrorKind::MalformedDescriptor,
            PsdError::InputTooLarge { .. } => ErrorKind::InputTooLarge,
        }
    }

    /// Absolute byte offset where the error was detected, if it has one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            PsdError::Io(_) | PsdError::InputTooLarge { .. } => None,
            PsdError::UnexpectedEof { offset, .. }
            | PsdError::InvalidSignature { offset, .. }
            | PsdError::InvalidResourceSignature { offset, .. }
            | PsdError::UnsupportedVersion { offset, .. }
            | PsdError::MalformedLength { offset, .. }
            | PsdError::InvalidBounds { offset, .. }
            | PsdError::MalformedVectorMask { offset, .. }
            | PsdError::MalformedDescriptor { offset, .. } => Some(*offset),
        }
    }

    /// Move the offset by `base`, for errors raised while decoding a payload
    /// that was copied out of the input at that position.
    pub fn shifted(mut self, base: u64) -> Self {
        match &mut self {
            PsdError::Io(_) | PsdError::InputTooLarge { .. } => {},
            PsdError::UnexpectedEof { offset, .. }
            | PsdError::InvalidSignature { offset, .. }
            | PsdError::InvalidResourceSignature { offset, .. }
            | PsdError::UnsupportedVersion { offset, .. }
            | PsdError::MalformedLength { offset, .. }
            | PsdError::InvalidBounds { offset, .. }
            | PsdError::MalformedVectorMask { offset, .. }
            | PsdError::MalformedDescriptor { offset, .. } => *offset += base,
        }
        self
    }
}

/// Result type for psdkit operations.
pub type Result<T> = std::result::Result<T, PsdError>;
