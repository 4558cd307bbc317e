//! Reader for the legacy (non-XML) VTK data file format.
//!
//! This crate implements the shared parsing core of the format: the
//! four-line file header, the per-scope attribute keyword loops
//! (`POINT_DATA`, `CELL_DATA`, `VERTEX_DATA`, `EDGE_DATA`, `ROW_DATA`),
//! typed array payloads in whitespace-delimited ASCII or big-endian
//! binary, the optional per-array METADATA tail (component names and
//! typed information keys), cell arrays in both the offsets/connectivity
//! and the legacy flat representations, and FIELD data groups.
//!
//! Dataset-geometry readers build on top of this core through the
//! [`Reader`] facade: they open the source, read the header, consume
//! their geometry sections with the token primitives, and hand each
//! `*_DATA` section to [`Reader::read_attributes`] together with an
//! [`Attributes`] sink.
//!
//! ```no_run
//! use vtkread::model::{Attributes, AttributeScope};
//! use vtkread::Reader;
//!
//! let mut reader = Reader::from_file("example.vtk");
//! reader.open()?;
//! reader.read_header()?;
//! // ... consume the DATASET sections, then:
//! let n: usize = 2;
//! let mut attributes = Attributes::new();
//! reader.read_attributes(AttributeScope::Point, n, &mut attributes)?;
//! # Ok::<(), vtkread::Error>(())
//! ```
//!
//! [`Reader`]: struct.Reader.html
//! [`Reader::read_attributes`]: struct.Reader.html#method.read_attributes
//! [`Attributes`]: model/struct.Attributes.html

use std::fmt;
use std::io;
use std::path::PathBuf;

pub mod coding;
pub mod info;
#[macro_use]
pub mod model;
pub mod tokenizer;

mod array;
mod attributes;
mod cells;
mod field;
mod reader;

pub use crate::reader::{AttributeKind, Reader, MAX_FILE_VERSION};

use crate::model::AttributeScope;

/// Error type for read operations.
#[derive(Debug)]
pub enum Error {
    /// Neither a file name nor an input buffer was configured.
    NoSource,
    /// The configured file could not be opened.
    SourceUnavailable { path: PathBuf, source: io::Error },
    /// The header prefix or the encoding token did not match the format.
    UnrecognizedFormat(String),
    /// The input ended in the middle of a record.
    TruncatedStream,
    /// An ASCII token failed to parse as a number.
    MalformedNumber(String),
    /// An array type tag is not part of the format's alphabet.
    InvalidArrayType(String),
    /// A section keyword is not recognized in the current scope.
    UnsupportedAttribute {
        scope: AttributeScope,
        keyword: String,
    },
    /// A texture coordinate dimension outside 1..=3.
    DimOutOfRange(i64),
    /// The DATASET kind does not match the expected kind.
    SchemaMismatch { expected: String, found: String },
}

/// The bare kind of an [`Error`], retained by the facade as the most
/// recent failure.
///
/// [`Error`]: enum.Error.html
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    NoSource,
    SourceUnavailable,
    UnrecognizedFormat,
    TruncatedStream,
    MalformedNumber,
    InvalidArrayType,
    UnsupportedAttribute,
    DimOutOfRange,
    SchemaMismatch,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoSource => ErrorKind::NoSource,
            Error::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Error::UnrecognizedFormat(_) => ErrorKind::UnrecognizedFormat,
            Error::TruncatedStream => ErrorKind::TruncatedStream,
            Error::MalformedNumber(_) => ErrorKind::MalformedNumber,
            Error::InvalidArrayType(_) => ErrorKind::InvalidArrayType,
            Error::UnsupportedAttribute { .. } => ErrorKind::UnsupportedAttribute,
            Error::DimOutOfRange(_) => ErrorKind::DimOutOfRange,
            Error::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoSource => write!(f, "no file name or input buffer specified"),
            Error::SourceUnavailable { path, source } => {
                write!(f, "unable to open file {:?}: {}", path, source)
            }
            Error::UnrecognizedFormat(what) => write!(f, "unrecognized file format: {:?}", what),
            Error::TruncatedStream => write!(f, "data ends prematurely"),
            Error::MalformedNumber(token) => {
                write!(f, "token {:?} does not parse as a number", token)
            }
            Error::InvalidArrayType(tag) => write!(f, "unsupported data type: {:?}", tag),
            Error::UnsupportedAttribute { scope, keyword } => {
                write!(f, "unsupported {} attribute type: {:?}", scope, keyword)
            }
            Error::DimOutOfRange(dim) => {
                write!(f, "unsupported texture coordinates dimension: {}", dim)
            }
            Error::SchemaMismatch { expected, found } => {
                write!(f, "expected dataset {:?}, found {:?}", expected, found)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SourceUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
