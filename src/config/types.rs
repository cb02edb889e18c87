use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::Locale;

/// Locale used when a project declares none.
pub const DEFAULT_SOURCE_LOCALE: &str = "en-US";

/// `projectType` of the projects this tool syncs.
pub const PROJECT_TYPE_APPLICATION: &str = "application";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "projects.app.i18n.locales.fr")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file '{}': {source}", path.display())]
    IoError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    JsoncError(#[from] jsonc_parser::errors::ParseError),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Configuration file is empty")]
    EmptyDocument,

    #[error("No project with projectType \"{PROJECT_TYPE_APPLICATION}\" found in the workspace")]
    NoApplicationProject,

    #[error("Project '{0}' not found in the workspace")]
    ProjectNotFound(String),

    #[error("No translation file configured for locale '{0}'")]
    MissingLocalePath(Locale),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `angular.json`, reduced to what the sync needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AngularWorkspace {
    /// Projects by name. Ordered, so "first" means first by name.
    pub projects: BTreeMap<String, ProjectConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub project_type: Option<String>,
    pub i18n: Option<I18nConfig>,
}

impl ProjectConfig {
    #[must_use]
    pub fn is_application(&self) -> bool {
        self.project_type.as_deref() == Some(PROJECT_TYPE_APPLICATION)
    }
}

/// The `i18n` section of a project.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nConfig {
    pub source_locale: Option<SourceLocaleConfig>,

    /// Translation files by locale. Usually excludes the source locale.
    pub locales: BTreeMap<Locale, LocaleConfig>,
}

impl I18nConfig {
    /// The configured source locale, [`DEFAULT_SOURCE_LOCALE`] when absent.
    #[must_use]
    pub fn source_locale(&self) -> &str {
        self.source_locale
            .as_ref()
            .and_then(SourceLocaleConfig::code)
            .unwrap_or(DEFAULT_SOURCE_LOCALE)
    }

    /// # Errors
    /// - Empty source locale
    /// - Empty locale tag
    /// - Locale without a translation path, or with an empty one
    pub fn validate(&self, field_path: &str) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(source_locale) = &self.source_locale
            && source_locale.code().is_some_and(str::is_empty)
        {
            errors.push(ValidationError::new(
                format!("{field_path}.sourceLocale"),
                "The source locale cannot be empty. Please specify a locale tag, for example: \"en-US\"",
            ));
        }

        for (locale, config) in &self.locales {
            let locale_path = format!("{field_path}.locales.{locale}");
            if locale.trim().is_empty() {
                errors.push(ValidationError::new(&locale_path, "The locale tag cannot be empty"));
            }
            match config.translation_path() {
                None => errors.push(ValidationError::new(
                    &locale_path,
                    "No translation file specified. Please specify the path of the XLIFF file for this locale",
                )),
                Some(path) if path.trim().is_empty() => errors.push(ValidationError::new(
                    &locale_path,
                    "The translation file path cannot be empty",
                )),
                Some(_) => {}
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// `sourceLocale`: either a bare tag or `{ "code": ..., "baseHref": ... }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceLocaleConfig {
    Code(Locale),
    Detailed {
        #[serde(default)]
        code: Option<Locale>,
    },
}

impl SourceLocaleConfig {
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Code(code) => Some(code),
            Self::Detailed { code } => code.as_deref(),
        }
    }
}

/// A value of `i18n.locales`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocaleConfig {
    Translation(TranslationPaths),
    Detailed { translation: TranslationPaths },
}

impl LocaleConfig {
    /// The XLIFF file the sync writes for this locale: the first one listed.
    #[must_use]
    pub fn translation_path(&self) -> Option<&str> {
        match self {
            Self::Translation(paths) | Self::Detailed { translation: paths } => paths.first(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TranslationPaths {
    Single(String),
    Multiple(Vec<String>),
}

impl TranslationPaths {
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(path) => Some(path),
            Self::Multiple(paths) => paths.first().map(String::as_str),
        }
    }
}
