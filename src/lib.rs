//! ngx-xlf-xlsx
//!
//! Angular の XLIFF 翻訳ファイルと Excel ワークブックを同期するツール

pub mod config;
pub mod spreadsheet;
pub mod sync;
pub mod translation;
pub mod types;
pub mod xliff;

mod test_utils;
