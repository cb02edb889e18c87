//! Excel workbook holding one row per translation key and one column per locale.

use std::path::{
    Path,
    PathBuf,
};

use calamine::{
    Data,
    Reader,
    Xlsx,
    open_workbook,
};
use rust_xlsxwriter::Workbook;
use thiserror::Error;

use crate::types::{
    Key,
    KeyLocaleValueMap,
    Locale,
    LocaleValueMap,
};

/// Label of the first header cell.
pub const KEY_COLUMN_LABEL: &str = "key";
/// Name given to the sheet when the workbook is written.
pub const SHEET_NAME: &str = "Sheet1";
/// Width of every written column, in characters.
pub const COLUMN_WIDTH: f64 = 50.0;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Failed to check spreadsheet '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read spreadsheet '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("Failed to write spreadsheet '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Spreadsheet '{}' has no sheet", path.display())]
    NoSheet { path: PathBuf },

    #[error("Spreadsheet '{}' must start with a '{KEY_COLUMN_LABEL}' header cell, found '{found}'", path.display())]
    InvalidHeader { path: PathBuf, found: String },

    #[error("Too many {what} to fit in a worksheet: {count}")]
    TooLarge { what: &'static str, count: usize },
}

/// The translations workbook at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spreadsheet {
    path: PathBuf,
}

impl Spreadsheet {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a header-only workbook if none exists yet.
    ///
    /// Returns `true` when the file was created.
    ///
    /// # Errors
    /// I/O failures while checking the path, or write failures.
    pub fn ensure_exists(
        &self,
        source_locale: &str,
        non_source_locales: &[Locale],
    ) -> Result<bool, SpreadsheetError> {
        let exists = self
            .path
            .try_exists()
            .map_err(|source| SpreadsheetError::Io { path: self.path.clone(), source })?;
        if exists {
            return Ok(false);
        }

        tracing::info!(path = %self.path.display(), "Creating spreadsheet");
        self.write(&KeyLocaleValueMap::new(), source_locale, non_source_locales)?;
        Ok(true)
    }

    /// Reads the first sheet into a key-major matrix.
    ///
    /// The header row names the locale of each column. Missing trailing cells
    /// read as empty values; rows without a key are skipped.
    ///
    /// # Errors
    /// Unreadable workbook, no sheet, or a header not starting with `key`.
    pub fn read(&self) -> Result<KeyLocaleValueMap, SpreadsheetError> {
        let read_error = |source| SpreadsheetError::Read { path: self.path.clone(), source };

        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(read_error)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SpreadsheetError::NoSheet { path: self.path.clone() })?;
        let range = workbook.worksheet_range(&sheet_name).map_err(read_error)?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(KeyLocaleValueMap::new());
        };
        let locales = self.read_header(header)?;

        let mut translations = KeyLocaleValueMap::new();
        for (index, row) in rows.enumerate() {
            let mut cells = row.iter().map(cell_text);
            let key: Key = cells.next().unwrap_or_default();
            if key.is_empty() {
                tracing::warn!(row = index + 2, "Skipping spreadsheet row without a key");
                continue;
            }

            let mut values: LocaleValueMap =
                locales.iter().map(|locale| (locale.clone(), String::new())).collect();
            for (locale, value) in locales.iter().zip(cells) {
                values.insert(locale.clone(), value);
            }
            translations.insert(key, values);
        }

        tracing::debug!(path = %self.path.display(), keys = translations.len(), "Read spreadsheet");
        Ok(translations)
    }

    fn read_header(&self, header: &[Data]) -> Result<Vec<Locale>, SpreadsheetError> {
        let mut cells = header.iter().map(cell_text);
        let first = cells.next().unwrap_or_default();
        if first != KEY_COLUMN_LABEL {
            return Err(SpreadsheetError::InvalidHeader { path: self.path.clone(), found: first });
        }
        Ok(cells.collect())
    }

    /// Writes `translations` as a fresh workbook.
    ///
    /// Columns are `key`, the source locale, then `non_source_locales` in the
    /// given order; rows follow ascending key order.
    ///
    /// # Errors
    /// Write failures, or more rows/columns than a worksheet holds.
    pub fn write(
        &self,
        translations: &KeyLocaleValueMap,
        source_locale: &str,
        non_source_locales: &[Locale],
    ) -> Result<(), SpreadsheetError> {
        let write_error = |source| SpreadsheetError::Write { path: self.path.clone(), source };

        let mut locales = Vec::with_capacity(non_source_locales.len() + 1);
        locales.push(source_locale);
        locales.extend(non_source_locales.iter().map(String::as_str));

        let mut header = vec![KEY_COLUMN_LABEL];
        header.extend(locales.iter().copied());

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).map_err(write_error)?;

        for (column, label) in header.iter().enumerate() {
            worksheet.write_string(0, column_number(column)?, *label).map_err(write_error)?;
            worksheet.set_column_width(column_number(column)?, COLUMN_WIDTH).map_err(write_error)?;
        }

        // BTreeMap iteration is already in ascending key order.
        for (index, (key, values)) in translations.iter().enumerate() {
            let row = row_number(index + 1)?;
            worksheet.write_string(row, 0, key.as_str()).map_err(write_error)?;
            for (column, locale) in locales.iter().enumerate() {
                let value = values.get(*locale).map_or("", String::as_str);
                worksheet.write_string(row, column_number(column + 1)?, value).map_err(write_error)?;
            }
        }

        workbook.save(&self.path).map_err(write_error)?;
        tracing::debug!(path = %self.path.display(), keys = translations.len(), "Wrote spreadsheet");
        Ok(())
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn column_number(index: usize) -> Result<u16, SpreadsheetError> {
    u16::try_from(index).map_err(|_| SpreadsheetError::TooLarge { what: "locales", count: index })
}

fn row_number(index: usize) -> Result<u32, SpreadsheetError> {
    u32::try_from(index).map_err(|_| SpreadsheetError::TooLarge { what: "keys", count: index })
}
