//! 同期対象プロジェクトの i18n 設定を解決するモジュール

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};

use super::{
    AngularWorkspace,
    ConfigError,
    I18nConfig,
    ProjectConfig,
    loader,
};
use crate::types::Locale;

/// ソース XLIFF ファイルの既定パス（`ng extract-i18n` の出力先）
pub const DEFAULT_SOURCE_XLIFF_PATH: &str = "src/locale/messages.xlf";

/// 解決済みのプロジェクト i18n 設定
///
/// パスはすべてワークスペースルートを基準に解決済み
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectI18n {
    /// プロジェクト名
    name: String,

    /// ソースロケール
    source_locale: Locale,

    /// ソース XLIFF ファイルのパス
    source_path: PathBuf,

    /// 非ソースロケールごとの XLIFF ファイルのパス
    locale_paths: BTreeMap<Locale, PathBuf>,
}

impl ProjectI18n {
    /// 設定ファイルを読み込み、プロジェクトの i18n 設定を解決する
    ///
    /// # Arguments
    /// * `config_path` - `angular.json` のパス
    /// * `workspace_root` - 相対パスの基準となるワークスペースのルートパス
    /// * `project` - プロジェクト名（`None` の場合は最初のアプリケーション）
    /// * `source_path` - ソース XLIFF ファイルのパス（`None` の場合は既定パス）
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSONC パースエラー
    /// - プロジェクトが見つからない
    /// - バリデーションエラー
    pub fn load(
        config_path: &Path,
        workspace_root: &Path,
        project: Option<&str>,
        source_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let workspace = loader::load_angular_workspace(config_path)?;
        Self::from_workspace(&workspace, workspace_root, project, source_path)
    }

    /// 読み込み済みのワークスペース設定からプロジェクトの i18n 設定を解決する
    ///
    /// # Errors
    /// - プロジェクトが見つからない
    /// - バリデーションエラー
    pub fn from_workspace(
        workspace: &AngularWorkspace,
        workspace_root: &Path,
        project: Option<&str>,
        source_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let (name, config) = select_project(workspace, project)?;
        tracing::debug!("Using project: {}", name);

        let default_i18n = I18nConfig::default();
        let i18n = config.i18n.as_ref().unwrap_or_else(|| {
            tracing::warn!(project = name, "Project has no i18n section; using defaults");
            &default_i18n
        });

        // バリデーション
        i18n.validate(&format!("projects.{name}.i18n")).map_err(ConfigError::ValidationErrors)?;

        let source_locale = i18n.source_locale().to_string();
        let mut locale_paths = BTreeMap::new();
        for (locale, locale_config) in &i18n.locales {
            if *locale == source_locale {
                tracing::warn!(locale = %locale, "Source locale listed among translated locales; ignoring it");
                continue;
            }
            let path = locale_config
                .translation_path()
                .ok_or_else(|| ConfigError::MissingLocalePath(locale.clone()))?;
            locale_paths.insert(locale.clone(), resolve_path(workspace_root, Path::new(path)));
        }

        let source_path = resolve_path(
            workspace_root,
            source_path.unwrap_or_else(|| Path::new(DEFAULT_SOURCE_XLIFF_PATH)),
        );

        Ok(Self { name: name.to_string(), source_locale, source_path, locale_paths })
    }

    /// プロジェクト名を取得
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ソースロケールを取得
    #[must_use]
    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    /// ソース XLIFF ファイルのパスを取得
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// 非ソースロケールを取得（名前順）
    #[must_use]
    pub fn non_source_locales(&self) -> Vec<Locale> {
        self.locale_paths.keys().cloned().collect()
    }

    /// ソースロケールを含む、全ロケールの XLIFF ファイルのパスを取得
    #[must_use]
    pub fn locale_paths(&self) -> BTreeMap<Locale, PathBuf> {
        let mut paths = self.locale_paths.clone();
        paths.insert(self.source_locale.clone(), self.source_path.clone());
        paths
    }

    /// 指定ロケールの XLIFF ファイルのパスを取得
    ///
    /// # Errors
    /// ロケールにパスが設定されていない
    pub fn locale_path(&self, locale: &str) -> Result<&Path, ConfigError> {
        if locale == self.source_locale {
            return Ok(&self.source_path);
        }
        self.locale_paths
            .get(locale)
            .map(PathBuf::as_path)
            .ok_or_else(|| ConfigError::MissingLocalePath(locale.to_string()))
    }
}

/// 同期対象のプロジェクトを選択する
///
/// 名前の指定がなければ、名前順で最初のアプリケーションプロジェクトを選ぶ
fn select_project<'a>(
    workspace: &'a AngularWorkspace,
    project: Option<&str>,
) -> Result<(&'a str, &'a ProjectConfig), ConfigError> {
    match project {
        Some(name) => workspace
            .projects
            .get_key_value(name)
            .map(|(name, config)| (name.as_str(), config))
            .ok_or_else(|| ConfigError::ProjectNotFound(name.to_string())),
        None => workspace
            .projects
            .iter()
            .find(|(_, config)| config.is_application())
            .map(|(name, config)| (name.as_str(), config))
            .ok_or(ConfigError::NoApplicationProject),
    }
}

fn resolve_path(workspace_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { path.to_path_buf() } else { workspace_root.join(path) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::ANGULAR_CONFIG_FILE;

    const WORKSPACE: &str = r#"{
        "projects": {
            "shared": { "projectType": "library" },
            "web": {
                "projectType": "application",
                "i18n": {
                    "sourceLocale": "en",
                    "locales": {
                        "fr": "src/locale/messages.fr.xlf",
                        "de": { "translation": ["src/locale/messages.de.xlf"] },
                        "en": "src/locale/messages.en.xlf"
                    }
                }
            },
            "admin": { "projectType": "application" }
        }
    }"#;

    fn workspace() -> AngularWorkspace {
        loader::parse_angular_workspace(WORKSPACE).unwrap()
    }

    /// from_workspace: 名前順で最初のアプリケーションを選ぶ
    #[rstest]
    fn test_from_workspace_selects_first_application() {
        let project = ProjectI18n::from_workspace(&workspace(), Path::new("/ws"), None, None).unwrap();

        assert_eq!(project.name(), "admin");
        assert_eq!(project.source_locale(), "en-US");
        assert!(project.non_source_locales().is_empty());
    }

    /// from_workspace: 指定したプロジェクトを選ぶ
    #[googletest::test]
    fn test_from_workspace_with_named_project() {
        let project =
            ProjectI18n::from_workspace(&workspace(), Path::new("/ws"), Some("web"), None).unwrap();

        expect_that!(project.source_locale(), eq("en"));
        expect_that!(project.non_source_locales(), elements_are![eq("de"), eq("fr")]);
        expect_that!(project.source_path(), eq(Path::new("/ws/src/locale/messages.xlf")));
        expect_that!(
            project.locale_path("de").unwrap(),
            eq(Path::new("/ws/src/locale/messages.de.xlf"))
        );
    }

    /// locale_paths: ソースロケールを含み、ソースと同じ非ソースロケールは無視される
    #[googletest::test]
    fn test_locale_paths_include_source_locale() {
        let project =
            ProjectI18n::from_workspace(&workspace(), Path::new("/ws"), Some("web"), None).unwrap();

        let paths = project.locale_paths();

        expect_that!(paths.len(), eq(3));
        expect_that!(paths.get("en"), some(eq(&PathBuf::from("/ws/src/locale/messages.xlf"))));
    }

    /// from_workspace: ソース XLIFF のパスを上書きできる
    #[rstest]
    #[case::relative("i18n/source.xlf", "/ws/i18n/source.xlf")]
    #[case::absolute("/elsewhere/source.xlf", "/elsewhere/source.xlf")]
    fn test_from_workspace_with_source_path(#[case] source_path: &str, #[case] expected: &str) {
        let project = ProjectI18n::from_workspace(
            &workspace(),
            Path::new("/ws"),
            Some("web"),
            Some(Path::new(source_path)),
        )
        .unwrap();

        assert_eq!(project.source_path(), Path::new(expected));
    }

    #[rstest]
    #[case::unknown_project(Some("missing"))]
    fn test_from_workspace_project_not_found(#[case] project: Option<&str>) {
        let result = ProjectI18n::from_workspace(&workspace(), Path::new("/ws"), project, None);

        assert!(matches!(result, Err(ConfigError::ProjectNotFound(name)) if name == "missing"));
    }

    #[rstest]
    fn test_from_workspace_without_application() {
        let workspace =
            loader::parse_angular_workspace(r#"{"projects": {"lib": {"projectType": "library"}}}"#)
                .unwrap();

        let result = ProjectI18n::from_workspace(&workspace, Path::new("/ws"), None, None);

        assert!(matches!(result, Err(ConfigError::NoApplicationProject)));
    }

    #[rstest]
    fn test_from_workspace_validation_error() {
        let workspace = loader::parse_angular_workspace(
            r#"{"projects": {"app": {"projectType": "application", "i18n": {"locales": {"fr": ""}}}}}"#,
        )
        .unwrap();

        let result = ProjectI18n::from_workspace(&workspace, Path::new("/ws"), None, None);

        assert!(matches!(result, Err(ConfigError::ValidationErrors(errors)) if errors.len() == 1));
    }

    #[googletest::test]
    fn test_locale_path_unknown_locale() {
        let project =
            ProjectI18n::from_workspace(&workspace(), Path::new("/ws"), Some("web"), None).unwrap();

        expect_that!(project.locale_path("ja"), err(displays_as(contains_substring("'ja'"))));
    }

    /// load: ファイルから読み込む
    #[rstest]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(ANGULAR_CONFIG_FILE);
        fs::write(&config_path, WORKSPACE).unwrap();

        let project = ProjectI18n::load(&config_path, temp_dir.path(), Some("web"), None).unwrap();

        assert_eq!(project.source_path(), temp_dir.path().join(DEFAULT_SOURCE_XLIFF_PATH));
    }
}
