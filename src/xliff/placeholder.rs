//! Conversion between XLIFF inline markup and flat, translator-editable text.
//!
//! Inline placeholders such as `<x id="INTERPOLATION" equiv-text="{{ name }}"/>`
//! are shown to translators as `${{INTERPOLATION}}` tokens. Both grammars live
//! here so the store and the unit synchronizer never see markup.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::escape::partial_escape;
use quick_xml::events::{
    BytesStart,
    Event,
};
use regex::Regex;
use thiserror::Error;

/// Local name of the placeholder element.
const PLACEHOLDER_TAG: &[u8] = b"x";
const ID_ATTRIBUTE: &str = "id";
const DISPLAY_TEXT_ATTRIBUTE: &str = "equiv-text";
/// Element wrapped around inline markup so it parses as a document.
const WRAPPER_TAG: &str = "inline";

/// `${{id}}`.
static PLACEHOLDER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?s)\$\{\{(.*?)\}\}").unwrap()
});

/// Error raised when inline markup cannot be decoded.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed inline markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed placeholder attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Placeholder without an 'id' attribute")]
    MissingId,

    #[error("Unsupported inline element <{0}>")]
    UnsupportedElement(String),
}

/// One inline placeholder of a translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Identifier, unique within its unit.
    pub id: String,
    /// Human-readable stand-in (`equiv-text`), purely cosmetic.
    pub display_text: Option<String>,
}

impl Placeholder {
    #[must_use]
    pub fn new(id: impl Into<String>, display_text: Option<&str>) -> Self {
        Self { id: id.into(), display_text: display_text.map(ToString::to_string) }
    }

    /// Renders the placeholder as a self-closing `<x/>` element.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut markup = format!(r#"<x {ID_ATTRIBUTE}="{}""#, escape_attribute(&self.id));
        if let Some(display_text) = &self.display_text {
            markup.push_str(&format!(
                r#" {DISPLAY_TEXT_ATTRIBUTE}="{}""#,
                escape_attribute(display_text)
            ));
        }
        markup.push_str("/>");
        markup
    }

    /// Renders the placeholder as a `${{id}}` token.
    #[must_use]
    pub fn to_token(&self) -> String {
        token(&self.id)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Non-fatal findings of [`encode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationWarning {
    #[error(
        "placeholder count in translation does not match the source: source had {} ({}) but translation has {} ({})",
        .expected.len(),
        .expected.join(", "),
        .actual.len(),
        .actual.join(", ")
    )]
    CountMismatch { expected: Vec<String>, actual: Vec<String> },

    #[error("placeholder '{id}' present in the source is missing from the translation")]
    MissingPlaceholder { id: String },

    #[error("placeholder '{id}' has no counterpart in the source; created a made up one")]
    UnknownPlaceholder { id: String },
}

/// Markup produced by [`encode`] together with what had to be reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub markup: String,
    pub warnings: Vec<ReconciliationWarning>,
}

/// Decodes the raw inner markup of a `<source>`/`<target>` element.
///
/// Returns the flat text (placeholders replaced by `${{id}}` tokens, character
/// entities resolved) and the placeholders in document order.
///
/// # Errors
/// [`CodecError`] when the markup is not well-formed, a placeholder has no id,
/// or an element other than `<x>` is found.
pub fn decode(raw: &str) -> Result<(String, Vec<Placeholder>), CodecError> {
    let wrapped = format!("<{WRAPPER_TAG}>{raw}</{WRAPPER_TAG}>");
    let mut reader = Reader::from_str(&wrapped);
    let mut text = String::with_capacity(raw.len());
    let mut placeholders = Vec::new();

    // the wrapper start tag
    reader.read_event()?;

    loop {
        match reader.read_event()? {
            Event::Empty(e) if is_placeholder(&e) => {
                let placeholder = read_placeholder(&e)?;
                text.push_str(&placeholder.to_token());
                placeholders.push(placeholder);
            }
            Event::Start(e) if is_placeholder(&e) => {
                let placeholder = read_placeholder(&e)?;
                text.push_str(&placeholder.to_token());
                placeholders.push(placeholder);
                reader.read_to_end(e.name())?;
            }
            Event::Start(e) | Event::Empty(e) => {
                return Err(CodecError::UnsupportedElement(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&e.decode().map_err(quick_xml::Error::from)?),
            // only the wrapper end tag is left unmatched
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }

    Ok((text, placeholders))
}

/// Encodes flat text back into inline markup.
///
/// Tokens whose id matches one of `placeholders` are replaced by that
/// placeholder's element; unknown ids get a made up placeholder whose display
/// text is the id. Text between tokens is escaped. Mismatches between the
/// tokens and `placeholders` are reported, never fatal.
#[must_use]
pub fn encode(text: &str, placeholders: &[Placeholder]) -> Encoded {
    let mut warnings = Vec::new();
    let mut markup = String::with_capacity(text.len());
    let mut token_ids = Vec::new();
    let mut last_end = 0;

    for caps in PLACEHOLDER_TOKEN.captures_iter(text) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let id = id.as_str();

        markup.push_str(&partial_escape(text.get(last_end..whole.start()).unwrap_or_default()));
        last_end = whole.end();
        token_ids.push(id.to_string());

        if let Some(placeholder) = placeholders.iter().find(|p| p.id == id) {
            markup.push_str(&placeholder.to_markup());
        } else {
            warnings.push(ReconciliationWarning::UnknownPlaceholder { id: id.to_string() });
            markup.push_str(&Placeholder::new(id, Some(id)).to_markup());
        }
    }
    markup.push_str(&partial_escape(text.get(last_end..).unwrap_or_default()));

    if token_ids.len() != placeholders.len() {
        warnings.push(ReconciliationWarning::CountMismatch {
            expected: placeholders.iter().map(|p| p.id.clone()).collect(),
            actual: token_ids.clone(),
        });
    }
    for placeholder in placeholders {
        if !token_ids.contains(&placeholder.id) {
            warnings.push(ReconciliationWarning::MissingPlaceholder { id: placeholder.id.clone() });
        }
    }

    Encoded { markup, warnings }
}

/// Ids of every `${{id}}` token in `text`, in order.
#[must_use]
pub fn token_ids(text: &str) -> Vec<String> {
    PLACEHOLDER_TOKEN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn token(id: &str) -> String {
    format!("${{{{{id}}}}}")
}

fn escape_attribute(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

fn is_placeholder(element: &BytesStart<'_>) -> bool {
    element.local_name().as_ref() == PLACEHOLDER_TAG
}

fn read_placeholder(element: &BytesStart<'_>) -> Result<Placeholder, CodecError> {
    let id = element
        .try_get_attribute(ID_ATTRIBUTE)?
        .ok_or(CodecError::MissingId)?
        .unescape_value()?
        .into_owned();
    let display_text = element
        .try_get_attribute(DISPLAY_TEXT_ATTRIBUTE)?
        .map(|attribute| attribute.unescape_value().map(Cow::into_owned))
        .transpose()?;

    Ok(Placeholder { id, display_text })
}
