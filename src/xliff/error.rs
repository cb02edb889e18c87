use std::path::PathBuf;

use thiserror::Error;

use super::placeholder::CodecError;
use crate::types::Key;

/// Errors raised while reading or writing an XLIFF file.
#[derive(Error, Debug)]
pub enum XliffError {
    #[error("Failed to access XLIFF file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write XLIFF document: {0}")]
    Write(#[from] std::io::Error),

    #[error("Malformed XLIFF document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XLIFF attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("XLIFF document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Unsupported XLIFF structure: {0}")]
    Structure(String),

    #[error("Translation unit without an 'id' attribute")]
    MissingUnitId,

    #[error("Translation unit '{key}' has no <source> element")]
    MissingSource { key: Key },

    #[error("Failed to decode placeholders of translation unit '{key}': {source}")]
    Placeholder {
        key: Key,
        #[source]
        source: CodecError,
    },
}
