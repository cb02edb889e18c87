//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される共通のフィクスチャとヘルパー関数を提供します。
#![cfg(test)]

use crate::types::{
    KeyLocaleValueMap,
    KeyValueMap,
};

/// `ng extract-i18n` が出力する形式のソース XLIFF
///
/// - `greeting`: プレースホルダーとコンテキストグループを持つユニット
/// - `farewell`: 追加属性を持つ単純なユニット
/// - `escaped`: エスケープされた文字を含むユニット
pub(crate) const SOURCE_XLIFF: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="en" datatype="plaintext" original="ng2.template">
    <body>
      <trans-unit id="greeting" datatype="html">
        <source>Hello <x id="INTERPOLATION" equiv-text="{{ name }}"/>!</source>
        <context-group purpose="location">
          <context context-type="sourcefile">src/app/app.component.html</context>
          <context context-type="linenumber">1</context>
        </context-group>
      </trans-unit>
      <trans-unit id="farewell" datatype="html">
        <source>Goodbye</source>
      </trans-unit>
      <trans-unit id="escaped" datatype="html">
        <source>Fish &amp; chips</source>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

/// キーと値のペアから [`KeyValueMap`] を作成する
pub(crate) fn key_values(entries: &[(&str, &str)]) -> KeyValueMap {
    entries.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

/// キーごとのロケール・値のペアから [`KeyLocaleValueMap`] を作成する
///
/// # Arguments
/// * `rows` - `(キー, [(ロケール, 値)])` のスライス
pub(crate) fn matrix(rows: &[(&str, &[(&str, &str)])]) -> KeyLocaleValueMap {
    rows.iter().map(|(key, values)| ((*key).to_string(), key_values(values))).collect()
}
