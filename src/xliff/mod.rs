//! XLIFF 1.2 translation files: document model, translation units and the
//! placeholder codec.
mod document;
mod element;
mod error;
pub mod placeholder;
mod unit;

pub use document::XliffDocument;
pub use element::{
    Attributes,
    Element,
    Node,
};
pub use error::XliffError;
pub use placeholder::{
    CodecError,
    Placeholder,
    ReconciliationWarning,
};
pub use unit::TransUnit;
