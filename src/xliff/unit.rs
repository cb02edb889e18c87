//! Translation unit: moves values between inline markup and flat text.

use super::element::{
    Attributes,
    Element,
};
use super::placeholder::{
    self,
    Placeholder,
    ReconciliationWarning,
};
use super::XliffError;
use crate::types::{
    Key,
    Value,
};

/// One `<trans-unit>` of an XLIFF file.
///
/// The source is decoded once, when the unit is built: its flat text feeds the
/// store under the source locale and its placeholders are kept to re-encode
/// targets later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
    id: Key,
    attributes: Attributes,
    source: String,
    source_text: Value,
    placeholders: Vec<Placeholder>,
    target: Option<String>,
    annotations: Vec<Element>,
}

impl TransUnit {
    /// Builds a unit from its raw parts, decoding the source markup.
    ///
    /// # Errors
    /// [`XliffError::Placeholder`] when the source markup cannot be decoded.
    pub fn new(
        id: impl Into<Key>,
        attributes: Attributes,
        source: impl Into<String>,
        target: Option<String>,
        annotations: Vec<Element>,
    ) -> Result<Self, XliffError> {
        let id = id.into();
        let source = source.into();
        let (source_text, placeholders) = placeholder::decode(&source)
            .map_err(|error| XliffError::Placeholder { key: id.clone(), source: error })?;

        Ok(Self { id, attributes, source, source_text, placeholders, target, annotations })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All attributes of the `<trans-unit>` element, `id` included.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Raw inner markup of `<source>`.
    #[must_use]
    pub fn source_markup(&self) -> &str {
        &self.source
    }

    /// Source in flat text form.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Raw inner markup of `<target>`, if any.
    #[must_use]
    pub fn target_markup(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn annotations(&self) -> &[Element] {
        &self.annotations
    }

    /// Encodes `value` against the source placeholders and stores it as the target.
    ///
    /// Reconciliation warnings are logged and returned; they never prevent the
    /// target from being set.
    pub fn set_target(&mut self, value: &str) -> Vec<ReconciliationWarning> {
        let encoded = placeholder::encode(value, &self.placeholders);

        for warning in &encoded.warnings {
            tracing::warn!(
                unit = %self.id,
                source = %self.source_text,
                translation = %value,
                "{warning}"
            );
        }

        self.target = Some(encoded.markup);
        encoded.warnings
    }
}
