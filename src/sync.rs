//! One sync run: source XLIFF and spreadsheet in, spreadsheet and per-locale XLIFF files out.

use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

use crate::config::{
    ANGULAR_CONFIG_FILE,
    ConfigError,
    ProjectI18n,
};
use crate::spreadsheet::{
    Spreadsheet,
    SpreadsheetError,
};
use crate::translation::{
    StoreError,
    TranslationStore,
};
use crate::types::{
    KeyValueMap,
    Locale,
    group_by_locale,
};
use crate::xliff::{
    XliffDocument,
    XliffError,
};

/// Spreadsheet path used when none is given, relative to the workspace root.
pub const DEFAULT_XLSX_PATH: &str = "translations.xlsx";

const STEP_COUNT: usize = 6;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Xliff(#[from] XliffError),

    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

/// Inputs of a run. Relative paths are resolved against `workspace_root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub workspace_root: PathBuf,
    /// `angular.json` by default.
    pub config_path: Option<PathBuf>,
    /// First application project by default.
    pub project: Option<String>,
    /// [`DEFAULT_XLSX_PATH`] by default.
    pub xlsx_path: Option<PathBuf>,
    /// `src/locale/messages.xlf` by default.
    pub source_xliff_path: Option<PathBuf>,
}

impl SyncOptions {
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            config_path: None,
            project: None,
            xlsx_path: None,
            source_xliff_path: None,
        }
    }

    fn resolved_config_path(&self) -> PathBuf {
        self.workspace_root
            .join(self.config_path.as_deref().unwrap_or_else(|| Path::new(ANGULAR_CONFIG_FILE)))
    }

    fn resolved_xlsx_path(&self) -> PathBuf {
        self.workspace_root
            .join(self.xlsx_path.as_deref().unwrap_or_else(|| Path::new(DEFAULT_XLSX_PATH)))
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub xlsx_path: PathBuf,
    /// Whether the spreadsheet had to be created.
    pub spreadsheet_created: bool,
    /// Written XLIFF files, in locale order.
    pub written: Vec<(Locale, PathBuf)>,
    /// Keys written to the spreadsheet.
    pub exported_keys: usize,
    /// Spreadsheet rows whose key is gone from the source.
    pub orphaned_keys: usize,
}

/// Runs one sync.
///
/// The source XLIFF decides which keys exist; the spreadsheet provides the
/// translations. Both the spreadsheet and every non-source XLIFF file are
/// rewritten from the merged state.
///
/// # Errors
/// Any configuration, read, merge or write failure aborts the run.
pub fn run(options: &SyncOptions) -> Result<SyncReport, SyncError> {
    let mut store = TranslationStore::new();

    step(1, "Reading Angular project configuration");
    let project = ProjectI18n::load(
        &options.resolved_config_path(),
        &options.workspace_root,
        options.project.as_deref(),
        options.source_xliff_path.as_deref(),
    )?;
    let source_locale = project.source_locale();
    let non_source_locales = project.non_source_locales();
    store.set_source_locale(source_locale);
    for locale in &non_source_locales {
        store.ensure_locale(locale);
    }

    step(2, "Reading source XLIFF file");
    let source_document = XliffDocument::read(project.source_path())?;
    if let Some(language) = source_document.source_language()
        && language != source_locale
    {
        tracing::warn!(
            source_language = language,
            source_locale,
            "XLIFF source-language differs from the configured source locale"
        );
    }
    store.add_translations(source_document.source_values(), source_locale)?;

    step(3, "Ensuring spreadsheet exists");
    let spreadsheet = Spreadsheet::new(options.resolved_xlsx_path());
    let spreadsheet_created = spreadsheet.ensure_exists(source_locale, &non_source_locales)?;

    step(4, "Reading spreadsheet");
    for (locale, values) in group_by_locale(&spreadsheet.read()?) {
        if locale == source_locale {
            tracing::debug!(locale = %locale, "Ignoring source locale column");
            continue;
        }
        if !store.has_locale(&locale) {
            tracing::warn!(locale = %locale, "Ignoring column of a locale missing from the configuration");
            continue;
        }
        tracing::info!("\tAdding translations for locale {locale:?}");
        store.add_translations(values, &locale)?;
    }

    step(5, "Writing spreadsheet");
    let exportable = store.exportable_translations();
    spreadsheet.write(&exportable, source_locale, &non_source_locales)?;

    step(6, "Writing XLIFF files");
    let translations_by_locale = store.translations_by_locale();
    let empty = KeyValueMap::new();
    let mut written = Vec::new();
    for locale in store.non_source_locales() {
        tracing::info!("\tWriting XLIFF file for locale {locale:?}");
        let path = project.locale_path(&locale)?;
        let translations = translations_by_locale.get(&locale).unwrap_or(&empty);
        source_document.with_translations(translations).write(path)?;
        written.push((locale, path.to_path_buf()));
    }

    let orphaned_keys = store.orphaned_keys().len();
    if orphaned_keys > 0 {
        tracing::info!(orphaned_keys, "Dropped keys no longer present in the source XLIFF file");
    }

    Ok(SyncReport {
        xlsx_path: spreadsheet.path().to_path_buf(),
        spreadsheet_created,
        written,
        exported_keys: exportable.len(),
        orphaned_keys,
    })
}

fn step(number: usize, description: &str) {
    tracing::info!("[{number}/{STEP_COUNT}]\t{description}");
}
