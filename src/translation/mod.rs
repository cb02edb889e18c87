//! In-memory translation state shared by the spreadsheet and the XLIFF files.
mod normalize;
mod store;

pub use normalize::normalize_value;
pub use store::{
    StoreError,
    TranslationStore,
};
