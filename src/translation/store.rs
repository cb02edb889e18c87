//! Translation state store merging values coming from the XLIFF files and the spreadsheet.

use std::collections::BTreeSet;

use thiserror::Error;

use super::normalize_value;
use crate::types::{
    Key,
    KeyLocaleValueMap,
    Locale,
    LocaleKeyValueMap,
    LocaleValueMap,
    Value,
    group_by_locale,
};

/// Errors raised by [`TranslationStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Without a source locale, a missing key cannot be told apart from a deleted one.
    #[error("Trying to add translations in locale '{locale}' but the source locale is not set yet")]
    SourceLocaleNotSet { locale: Locale },
}

/// Key × locale translation matrix.
///
/// The matrix is always dense: every known key has a value for every known
/// locale, backfilled with the store's default value. Keys only become live
/// (exportable) when they are submitted under the source locale; keys that
/// disappeared from the source are kept internally but never exported.
#[derive(Debug, Clone)]
pub struct TranslationStore {
    /// Known locales, in registration order.
    locales: Vec<Locale>,
    /// The locale deciding which keys are live.
    source_locale: Option<Locale>,
    /// Keys seen under the source locale.
    source_keys: BTreeSet<Key>,
    /// The dense matrix.
    translations: KeyLocaleValueMap,
    /// Value used to backfill missing cells.
    default_value: Value,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore {
    /// Creates an empty store backfilling with empty strings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_value(Value::new())
    }

    /// Creates an empty store backfilling missing cells with `default_value`.
    #[must_use]
    pub fn with_default_value(default_value: impl Into<Value>) -> Self {
        Self {
            locales: Vec::new(),
            source_locale: None,
            source_keys: BTreeSet::new(),
            translations: KeyLocaleValueMap::new(),
            default_value: default_value.into(),
        }
    }

    /// Registers `locale` if unknown and backfills it for every existing key.
    pub fn ensure_locale(&mut self, locale: &str) {
        if self.has_locale(locale) {
            return;
        }

        tracing::debug!(locale, "Registering locale");
        self.locales.push(locale.to_string());
        let default_value = &self.default_value;
        for values in self.translations.values_mut() {
            values.entry(locale.to_string()).or_insert_with(|| default_value.clone());
        }
    }

    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|known| known == locale)
    }

    /// Registers `locale` and makes it the source locale.
    ///
    /// Calling it again re-points the source locale; keys already classified
    /// as source keys stay so.
    pub fn set_source_locale(&mut self, locale: &str) {
        self.ensure_locale(locale);
        self.source_locale = Some(locale.to_string());
    }

    #[must_use]
    pub fn source_locale(&self) -> Option<&str> {
        self.source_locale.as_deref()
    }

    /// Known locales, in registration order.
    #[must_use]
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Merges `values` into the matrix under `locale`.
    ///
    /// Values overwrite earlier ones for the same key and locale; keys absent
    /// from `values` are left untouched. Only a submission under the source
    /// locale makes a key live.
    ///
    /// # Errors
    /// [`StoreError::SourceLocaleNotSet`] when no source locale has been set.
    pub fn add_translations<I, K, V>(&mut self, values: I, locale: &str) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: AsRef<str>,
    {
        let Some(source_locale) = self.source_locale.clone() else {
            return Err(StoreError::SourceLocaleNotSet { locale: locale.to_string() });
        };

        self.ensure_locale(locale);
        let is_source = locale == source_locale;

        let mut count = 0_usize;
        for (key, value) in values {
            let key = key.into();
            if is_source {
                self.source_keys.insert(key.clone());
            }
            let normalized = normalize_value(value.as_ref());
            self.ensure_key(&key).insert(locale.to_string(), normalized);
            count += 1;
        }

        tracing::debug!(locale, count, is_source, "Added translations");
        Ok(())
    }

    /// Returns the row of `key`, creating and backfilling it first if needed.
    fn ensure_key(&mut self, key: &str) -> &mut LocaleValueMap {
        let values = self.translations.entry(key.to_string()).or_default();
        for locale in &self.locales {
            if !values.contains_key(locale) {
                values.insert(locale.clone(), self.default_value.clone());
            }
        }
        values
    }

    /// All known locales except the source locale, sorted ascending.
    #[must_use]
    pub fn non_source_locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self
            .locales
            .iter()
            .filter(|locale| self.source_locale.as_ref() != Some(*locale))
            .cloned()
            .collect();
        locales.sort();
        locales
    }

    /// The live part of the matrix: source keys only, orphaned keys left out.
    #[must_use]
    pub fn exportable_translations(&self) -> KeyLocaleValueMap {
        self.source_keys
            .iter()
            .filter_map(|key| self.translations.get(key).map(|values| (key.clone(), values.clone())))
            .collect()
    }

    /// The exportable translations grouped by locale instead of by key.
    #[must_use]
    pub fn translations_by_locale(&self) -> LocaleKeyValueMap {
        group_by_locale(&self.exportable_translations())
    }

    /// Looks up a single cell, orphaned keys included.
    #[must_use]
    pub fn value(&self, key: &str, locale: &str) -> Option<&str> {
        self.translations.get(key)?.get(locale).map(String::as_str)
    }

    #[must_use]
    pub fn is_source_key(&self, key: &str) -> bool {
        self.source_keys.contains(key)
    }

    /// Keys held in the matrix that are no longer part of the source.
    #[must_use]
    pub fn orphaned_keys(&self) -> Vec<&str> {
        self.translations
            .keys()
            .filter(|key| !self.source_keys.contains(*key))
            .map(String::as_str)
            .collect()
    }

    /// Number of keys in the matrix, orphaned keys included.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.translations.len()
    }

    /// Checks that every key has a value for every known locale.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.translations
            .values()
            .all(|values| self.locales.iter().all(|locale| values.contains_key(locale)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::types::group_by_key;

    fn values(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
    }

    fn store_with_source(source: &str) -> TranslationStore {
        let mut store = TranslationStore::new();
        store.set_source_locale(source);
        store
    }

    #[googletest::test]
    fn test_set_source_locale_after_ensure() {
        let mut store = TranslationStore::new();

        store.ensure_locale("en");
        store.set_source_locale("en");

        expect_that!(store.source_locale(), some(eq("en")));
        expect_that!(store.locales().len(), eq(1));
    }

    #[googletest::test]
    fn test_set_source_locale_registers_locale() {
        let store = store_with_source("en");

        expect_that!(store.source_locale(), some(eq("en")));
        expect_that!(store.has_locale("en"), eq(true));
    }

    #[googletest::test]
    fn test_has_locale_unknown() {
        let store = TranslationStore::new();

        expect_that!(store.has_locale("en"), eq(false));
    }

    #[googletest::test]
    fn test_ensure_locale_is_idempotent() {
        let mut store = store_with_source("en");
        store.add_translations(values(&[("k1", "v1")]), "en").unwrap();

        store.ensure_locale("fr");
        store.ensure_locale("fr");

        expect_that!(store.locales().len(), eq(2));
        expect_that!(store.value("k1", "en"), some(eq("v1")));
        expect_that!(store.value("k1", "fr"), some(eq("")));
    }

    #[rstest]
    #[case("en")]
    #[case("fr")]
    #[case("")]
    fn test_add_translations_without_source_locale_fails(#[case] locale: &str) {
        let mut store = TranslationStore::new();
        store.ensure_locale("en");

        let result = store.add_translations(values(&[("k1", "v1")]), locale);

        assert_that!(
            result,
            err(eq(&StoreError::SourceLocaleNotSet { locale: locale.to_string() }))
        );
        assert_that!(store.key_count(), eq(0));
    }

    #[googletest::test]
    fn test_add_translations_in_source_locale() {
        let mut store = store_with_source("en");

        store.add_translations(values(&[("key1", "value1"), ("key2", "value2")]), "en").unwrap();

        expect_that!(store.value("key1", "en"), some(eq("value1")));
        expect_that!(store.value("key2", "en"), some(eq("value2")));
        expect_that!(store.is_source_key("key1"), eq(true));
        expect_that!(store.is_source_key("key2"), eq(true));
    }

    #[googletest::test]
    fn test_add_translations_normalizes_values() {
        let mut store = store_with_source("en");

        store.add_translations(values(&[("k", "  a   b  ")]), "en").unwrap();

        expect_that!(store.value("k", "en"), some(eq("a b")));
    }

    #[googletest::test]
    fn test_add_translations_backfills_new_locale() {
        let mut store = store_with_source("en");
        store.ensure_locale("fr");

        store.add_translations(values(&[("key1", "value1"), ("key2", "value2")]), "en").unwrap();
        store.add_translations(values(&[("key1", "valeur1")]), "fr").unwrap();

        expect_that!(store.value("key1", "fr"), some(eq("valeur1")));
        expect_that!(store.value("key2", "fr"), some(eq("")));
    }

    #[googletest::test]
    fn test_add_translations_overlays_existing() {
        let mut store = store_with_source("en");
        store.ensure_locale("fr");

        store.add_translations(values(&[("key1", "value1"), ("key2", "value2")]), "en").unwrap();
        store.add_translations(values(&[("key1", "valeur1")]), "fr").unwrap();
        store.add_translations(values(&[("key2", "valeur2")]), "fr").unwrap();

        expect_that!(store.value("key1", "fr"), some(eq("valeur1")));
        expect_that!(store.value("key2", "fr"), some(eq("valeur2")));
    }

    #[googletest::test]
    fn test_add_translations_non_source_key_is_not_live() {
        let mut store = store_with_source("en");
        store.ensure_locale("fr");

        store.add_translations(values(&[("key1", "value1")]), "en").unwrap();
        store.add_translations(values(&[("key1", "value1"), ("key2", "value2")]), "fr").unwrap();

        expect_that!(store.value("key2", "fr"), some(eq("value2")));
        expect_that!(store.value("key2", "en"), some(eq("")));
        expect_that!(store.is_source_key("key2"), eq(false));
        expect_that!(store.orphaned_keys(), elements_are![eq(&"key2")]);
        expect_that!(store.exportable_translations().contains_key("key2"), eq(false));
    }

    #[googletest::test]
    fn test_key_removed_from_source_is_kept_but_not_exported() {
        let mut previous_run = store_with_source("en");
        previous_run.add_translations(values(&[("k1", "a"), ("k2", "b")]), "en").unwrap();
        previous_run.add_translations(values(&[("k1", "a"), ("k2", "b")]), "fr").unwrap();
        let spreadsheet = crate::types::group_by_locale(&previous_run.exportable_translations());

        let mut store = store_with_source("en");
        store.add_translations(values(&[("k1", "a")]), "en").unwrap();
        for (locale, column) in &spreadsheet {
            if locale != "en" {
                store.add_translations(column.clone(), locale).unwrap();
            }
        }

        expect_that!(store.value("k2", "fr"), some(eq("b")));
        expect_that!(store.exportable_translations().contains_key("k2"), eq(false));
        expect_that!(store.exportable_translations().contains_key("k1"), eq(true));
        expect_that!(store.orphaned_keys(), elements_are![eq(&"k2")]);
    }

    #[googletest::test]
    fn test_reingesting_source_subset_keeps_values() {
        let mut store = store_with_source("en");
        store.add_translations(values(&[("k1", "a"), ("k2", "b")]), "en").unwrap();
        store.add_translations(values(&[("k1", "a"), ("k2", "b")]), "fr").unwrap();

        store.add_translations(values(&[("k1", "a")]), "en").unwrap();

        expect_that!(store.value("k2", "fr"), some(eq("b")));
        expect_that!(store.value("k2", "en"), some(eq("b")));
    }

    #[googletest::test]
    fn test_matrix_stays_dense() {
        let mut store = store_with_source("en");
        store.add_translations(values(&[("a", "1")]), "en").unwrap();
        store.ensure_locale("de");
        store.add_translations(values(&[("b", "2")]), "fr").unwrap();
        store.add_translations(values(&[("c", "3")]), "en").unwrap();
        store.ensure_locale("nl");

        expect_that!(store.is_dense(), eq(true));
        expect_that!(store.value("b", "nl"), some(eq("")));
        expect_that!(store.value("c", "de"), some(eq("")));
    }

    #[googletest::test]
    fn test_custom_default_value_is_used_for_backfill() {
        let mut store = TranslationStore::with_default_value("TODO");
        store.set_source_locale("en");
        store.add_translations(values(&[("a", "1")]), "en").unwrap();

        store.ensure_locale("fr");

        expect_that!(store.value("a", "fr"), some(eq("TODO")));
    }

    #[googletest::test]
    fn test_non_source_locales_sorted() {
        let mut store = store_with_source("en");
        store.ensure_locale("nl");
        store.ensure_locale("de");
        store.ensure_locale("fr");

        expect_that!(store.non_source_locales(), elements_are![eq("de"), eq("fr"), eq("nl")]);
    }

    #[googletest::test]
    fn test_non_source_locales_without_source() {
        let mut store = TranslationStore::new();
        store.ensure_locale("fr");

        expect_that!(store.non_source_locales(), elements_are![eq("fr")]);
    }

    #[googletest::test]
    fn test_translations_by_locale_round_trip() {
        let mut store = store_with_source("en");
        store.ensure_locale("fr");
        store.add_translations(values(&[("a", "A"), ("b", "B")]), "en").unwrap();
        store.add_translations(values(&[("a", "À"), ("orphan", "x")]), "fr").unwrap();

        let exportable = store.exportable_translations();
        let by_locale = store.translations_by_locale();

        expect_that!(by_locale.len(), eq(2));
        expect_that!(
            by_locale.get("fr").and_then(|values| values.get("b")),
            some(eq(&String::new()))
        );
        expect_that!(
            by_locale.get("fr").and_then(|values| values.get("orphan")),
            none()
        );
        expect_that!(group_by_key(&by_locale), eq(&exportable));
    }
}
