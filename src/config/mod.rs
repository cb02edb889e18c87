//! Angular workspace configuration (`angular.json`).

/// Config file loader
mod loader;
/// Project i18n resolution
mod project;
/// Configuration types and validation
mod types;

pub use loader::ANGULAR_CONFIG_FILE;
pub use project::{
    DEFAULT_SOURCE_XLIFF_PATH,
    ProjectI18n,
};
pub use types::{
    AngularWorkspace,
    ConfigError,
    DEFAULT_SOURCE_LOCALE,
    I18nConfig,
    LocaleConfig,
    PROJECT_TYPE_APPLICATION,
    ProjectConfig,
    SourceLocaleConfig,
    TranslationPaths,
    ValidationError,
};
