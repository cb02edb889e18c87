//! Core types used throughout the project.

use std::collections::BTreeMap;

/// A locale tag, with or without region (e.g. `en-US`, `fr`, `nl-BE`).
///
/// Compared by exact string identity; no normalization is applied.
pub type Locale = String;

/// A translation key, as assigned by the XLIFF extraction (content-addressed).
pub type Key = String;

/// A translation value in flat text form (placeholders as `${{id}}` tokens).
pub type Value = String;

/// Values of a single locale, keyed by translation key.
pub type KeyValueMap = BTreeMap<Key, Value>;

/// Values of a single key, keyed by locale.
pub type LocaleValueMap = BTreeMap<Locale, Value>;

/// Key-major translation matrix (the spreadsheet's natural shape).
pub type KeyLocaleValueMap = BTreeMap<Key, LocaleValueMap>;

/// Locale-major translation matrix (the XLIFF files' natural shape).
pub type LocaleKeyValueMap = BTreeMap<Locale, KeyValueMap>;

/// Groups translations by locale instead of by key.
///
/// The spreadsheet provides translations key by key, while each XLIFF file
/// needs every value of one locale.
#[must_use]
pub fn group_by_locale(translations: &KeyLocaleValueMap) -> LocaleKeyValueMap {
    let mut grouped = LocaleKeyValueMap::new();

    for (key, values) in translations {
        for (locale, value) in values {
            grouped.entry(locale.clone()).or_default().insert(key.clone(), value.clone());
        }
    }

    grouped
}

/// Groups translations by key instead of by locale. Inverse of [`group_by_locale`].
#[must_use]
pub fn group_by_key(translations: &LocaleKeyValueMap) -> KeyLocaleValueMap {
    let mut grouped = KeyLocaleValueMap::new();

    for (locale, values) in translations {
        for (key, value) in values {
            grouped.entry(key.clone()).or_default().insert(locale.clone(), value.clone());
        }
    }

    grouped
}
