use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Why a single field value could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    #[error("{0} is not a valid radical code")]
    InvalidRadical(i32),
    #[error("{0} is not a valid bond order")]
    InvalidBondOrder(i32),
}

/// Fatal errors produced while reading a V3000 connection table.
///
/// Every variant carries the physical line number (1-based) at which the
/// problem was found.
#[derive(Debug, Error)]
pub enum MolfileError {
    /// The input does not have the shape of a V3000 connection table.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
    /// A recognized field held a value of the wrong kind.
    #[error("line {line}: could not parse {key}={value}: {source}")]
    FieldParse {
        line: usize,
        key: String,
        value: String,
        #[source]
        source: FieldError,
    },
    /// The underlying line source failed.
    #[error("line {line}: read failed: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl MolfileError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn field(
        line: usize,
        key: impl Into<String>,
        value: impl Into<String>,
        source: impl Into<FieldError>,
    ) -> Self {
        Self::FieldParse {
            line,
            key: key.into(),
            value: value.into(),
            source: source.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Format { line, .. } | Self::FieldParse { line, .. } | Self::Io { line, .. } => {
                *line
            }
        }
    }
}

/// Kinds of input the reader recognizes but does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// Command outside any block that is not `COUNTS` or a block header.
    UnknownCommand(String),
    /// Option key the record type does not interpret.
    UnknownKey { key: String, value: String },
    /// Bond order code 4 and above.
    QueryBondOrder(u32),
    /// Sgroup type other than `SUP`.
    UnsupportedSgroup(String),
    /// Nonzero atom-atom mapping number.
    AtomMapping(String),
    /// Element symbol that was read as a pseudo-atom.
    UnknownElement(String),
    /// `VAL=` on a pseudo-atom, or a `VAL=` value that is not a number.
    IgnoredValence(String),
    /// Valence could not be resolved because of a query bond.
    QueryValence { atom_id: u32 },
    /// Option text that does not look like `KEY=value`.
    TrailingText(String),
    /// Id list whose leading count disagrees with the ids that follow.
    IdCountMismatch {
        key: String,
        declared: usize,
        found: usize,
    },
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(c) => write!(f, "unrecognized command: {}", c),
            Self::UnknownKey { key, value } => write!(f, "not parsing key: {}={}", key, value),
            Self::QueryBondOrder(o) => write!(f, "query bond order {} is not supported", o),
            Self::UnsupportedSgroup(t) => write!(f, "skipping unsupported sgroup type {}", t),
            Self::AtomMapping(m) => write!(f, "skipping atom-atom mapping {}", m),
            Self::UnknownElement(s) => write!(f, "{} is not an element, read as a pseudo-atom", s),
            Self::IgnoredValence(v) => write!(f, "ignoring valence {}", v),
            Self::QueryValence { atom_id } => {
                write!(f, "cannot set valence for atom {} with query bonds", atom_id)
            }
            Self::TrailingText(t) => write!(f, "could not parse option text: {}", t),
            Self::IdCountMismatch {
                key,
                declared,
                found,
            } => write!(f, "{} declares {} ids but lists {}", key, declared, found),
        }
    }
}

/// Non-fatal diagnostic collected while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub kind: WarningKind,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}
