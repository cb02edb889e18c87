//! 設定ファイルの読み込み関数

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    AngularWorkspace,
    ConfigError,
};

/// ワークスペース設定ファイルの既定名
pub const ANGULAR_CONFIG_FILE: &str = "angular.json";

/// `angular.json` を読み込む
///
/// コメントと末尾カンマを許容する（JSONC として解析）
///
/// # Arguments
/// * `config_path` - 設定ファイルのパス
///
/// # Returns
/// - `Ok(workspace)`: 読み込みに成功
/// - `Err(ConfigError)`: ファイル読み込みまたはパースエラー
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSONC 構文エラー
/// - 空のファイル
/// - 型の不一致
pub(super) fn load_angular_workspace(config_path: &Path) -> Result<AngularWorkspace, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)
        .map_err(|source| ConfigError::IoError { path: config_path.to_path_buf(), source })?;

    parse_angular_workspace(&content)
}

/// `angular.json` の内容を解析する
pub(super) fn parse_angular_workspace(content: &str) -> Result<AngularWorkspace, ConfigError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())?
        .ok_or(ConfigError::EmptyDocument)?;
    let workspace: AngularWorkspace = serde_json::from_value(value)?;

    tracing::debug!("Found {} project(s)", workspace.projects.len());
    Ok(workspace)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    /// `load_angular_workspace`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_angular_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"projects": {"app": {"projectType": "application"}}}"#;
        fs::write(temp_dir.path().join(ANGULAR_CONFIG_FILE), config_content).unwrap();

        let result = load_angular_workspace(&temp_dir.path().join(ANGULAR_CONFIG_FILE));

        assert!(result.is_ok());
        let workspace = result.unwrap();
        assert_eq!(workspace.projects.len(), 1);
        assert!(workspace.projects["app"].is_application());
    }

    /// `load_angular_workspace`: 設定ファイルが存在しない場合
    #[rstest]
    fn test_load_angular_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_angular_workspace(&temp_dir.path().join(ANGULAR_CONFIG_FILE));

        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    /// `parse_angular_workspace`: コメントと末尾カンマを許容する
    #[rstest]
    fn test_parse_angular_workspace_with_comments() {
        let content = r#"{
            // generated by the Angular CLI
            "projects": {
                "app": {
                    "projectType": "application", /* main app */
                    "i18n": { "sourceLocale": "en", "locales": { "fr": "src/locale/messages.fr.xlf", } },
                },
            },
        }"#;

        let workspace = parse_angular_workspace(content).unwrap();

        let i18n = workspace.projects["app"].i18n.as_ref().unwrap();
        assert_eq!(i18n.source_locale(), "en");
        assert_eq!(
            i18n.locales["fr"].translation_path(),
            Some("src/locale/messages.fr.xlf")
        );
    }

    /// `parse_angular_workspace`: 解析エラー
    #[rstest]
    #[case::invalid_syntax("invalid json")]
    #[case::empty("")]
    #[case::wrong_type(r#"{"projects": []}"#)]
    fn test_parse_angular_workspace_errors(#[case] content: &str) {
        let result = parse_angular_workspace(content);

        assert!(result.is_err());
    }
}
