//! XLIFF 1.2 document reading and writing.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{
    BytesDecl,
    BytesEnd,
    BytesStart,
    BytesText,
    Event,
};
use quick_xml::{
    Reader,
    Writer,
};

use super::XliffError;
use super::element::{
    Attributes,
    Element,
    attribute,
    element_name,
    read_attributes,
    start_tag,
};
use super::unit::TransUnit;
use crate::types::KeyValueMap;

const XLIFF_TAG: &str = "xliff";
const FILE_TAG: &str = "file";
const BODY_TAG: &str = "body";
const UNIT_TAG: &str = "trans-unit";
const SOURCE_TAG: &str = "source";
const TARGET_TAG: &str = "target";
const SOURCE_LANGUAGE_ATTRIBUTE: &str = "source-language";
const ORIGINAL_ATTRIBUTE: &str = "original";
const INDENT_SIZE: usize = 2;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// An XLIFF 1.2 file: one `<file>` holding an ordered list of translation units.
///
/// Documents are immutable templates for the per-locale output:
/// [`XliffDocument::with_translations`] returns a new document and never
/// touches the one it was called on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XliffDocument {
    root_attributes: Attributes,
    file_attributes: Attributes,
    /// Children of `<file>` other than `<body>` (e.g. `<header>`).
    file_children: Vec<Element>,
    units: Vec<TransUnit>,
}

impl XliffDocument {
    /// Reads and parses the XLIFF file at `path`.
    ///
    /// # Errors
    /// I/O failures and anything [`XliffDocument::parse`] rejects.
    pub fn read(path: &Path) -> Result<Self, XliffError> {
        tracing::debug!(path = %path.display(), "Reading XLIFF file");
        let content = std::fs::read_to_string(path)
            .map_err(|source| XliffError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&content)
    }

    /// Parses an XLIFF document.
    ///
    /// # Errors
    /// Malformed XML, a missing `<file>`, more than one `<file>`, a unit without
    /// id or `<source>`, or a source whose placeholders cannot be decoded.
    pub fn parse(content: &str) -> Result<Self, XliffError> {
        let mut reader = Reader::from_str(content);
        let mut root_attributes = None;
        let mut file_attributes = None;
        let mut file_children = Vec::new();
        let mut units = Vec::new();
        let mut in_file = false;
        let mut in_body = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match element_name(&e)?.as_str() {
                    XLIFF_TAG => root_attributes = Some(read_attributes(&e)?),
                    FILE_TAG => {
                        if file_attributes.is_some() {
                            return Err(XliffError::Structure(
                                "more than one <file> element".to_string(),
                            ));
                        }
                        file_attributes = Some(read_attributes(&e)?);
                        in_file = true;
                    }
                    BODY_TAG => in_body = true,
                    UNIT_TAG if in_body => units.push(read_unit(&mut reader, &e)?),
                    name if in_body => return Err(unsupported_in_body(name)),
                    UNIT_TAG => {
                        return Err(XliffError::Structure(format!(
                            "<{UNIT_TAG}> outside <{BODY_TAG}>"
                        )));
                    }
                    _ if in_file => file_children.push(Element::read(&mut reader, &e)?),
                    name => {
                        return Err(XliffError::Structure(format!("unexpected <{name}> element")));
                    }
                },
                Event::Empty(e) => match element_name(&e)?.as_str() {
                    BODY_TAG => {}
                    UNIT_TAG => {
                        return Err(XliffError::Structure(format!("empty <{UNIT_TAG}> element")));
                    }
                    name if in_body => return Err(unsupported_in_body(name)),
                    FILE_TAG => {
                        return Err(XliffError::Structure("empty <file> element".to_string()));
                    }
                    _ if in_file => file_children.push(Element::from_empty(&e)?),
                    name => {
                        return Err(XliffError::Structure(format!("unexpected <{name}> element")));
                    }
                },
                Event::End(e) if e.name().as_ref() == BODY_TAG.as_bytes() => in_body = false,
                Event::End(e) if e.name().as_ref() == FILE_TAG.as_bytes() => in_file = false,
                Event::Eof => break,
                _ => {}
            }
        }

        let root_attributes = root_attributes
            .ok_or_else(|| XliffError::Structure(format!("missing <{XLIFF_TAG}> root element")))?;
        let file_attributes = file_attributes
            .ok_or_else(|| XliffError::Structure(format!("missing <{FILE_TAG}> element")))?;

        tracing::debug!(units = units.len(), "Parsed XLIFF document");
        Ok(Self { root_attributes, file_attributes, file_children, units })
    }

    /// The `source-language` declared on `<file>`.
    #[must_use]
    pub fn source_language(&self) -> Option<&str> {
        attribute(&self.file_attributes, SOURCE_LANGUAGE_ATTRIBUTE)
    }

    /// The `original` document reference declared on `<file>`.
    #[must_use]
    pub fn original(&self) -> Option<&str> {
        attribute(&self.file_attributes, ORIGINAL_ATTRIBUTE)
    }

    #[must_use]
    pub fn units(&self) -> &[TransUnit] {
        &self.units
    }

    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&TransUnit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    /// Flat source text of every unit, keyed by unit id.
    #[must_use]
    pub fn source_values(&self) -> KeyValueMap {
        let mut values = KeyValueMap::new();
        for unit in &self.units {
            if values.insert(unit.id().to_string(), unit.source_text().to_string()).is_some() {
                tracing::warn!(unit = unit.id(), "Duplicate translation unit id; keeping the last one");
            }
        }
        values
    }

    /// Returns a copy of this document with `translations` set as unit targets.
    ///
    /// Units without a value keep their current target. Every unit sharing an
    /// id gets the same target. Values without a unit are skipped.
    #[must_use]
    pub fn with_translations(&self, translations: &KeyValueMap) -> Self {
        let mut document = self.clone();
        let mut targeted = HashSet::new();

        for unit in &mut document.units {
            if let Some(value) = translations.get(unit.id()) {
                if !targeted.insert(unit.id().to_string()) {
                    tracing::warn!(unit = unit.id(), "Duplicate translation unit id; setting the same target");
                }
                unit.set_target(value);
            }
        }

        for key in translations.keys().filter(|key| !targeted.contains(*key)) {
            tracing::warn!(key, "Spreadsheet key has no translation unit in the source XLIFF file; skipping");
        }

        document
    }

    /// Serializes the document with an XML declaration and two-space indentation.
    ///
    /// # Errors
    /// Only if the underlying XML writer fails.
    pub fn to_xml(&self) -> Result<String, XliffError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(start_tag(XLIFF_TAG, &self.root_attributes)))?;
        writer.write_event(Event::Start(start_tag(FILE_TAG, &self.file_attributes)))?;
        for child in &self.file_children {
            child.write(&mut writer)?;
        }
        writer.write_event(Event::Start(BytesStart::new(BODY_TAG)))?;
        for unit in &self.units {
            write_unit(&mut writer, unit)?;
        }
        writer.write_event(Event::End(BytesEnd::new(BODY_TAG)))?;
        writer.write_event(Event::End(BytesEnd::new(FILE_TAG)))?;
        writer.write_event(Event::End(BytesEnd::new(XLIFF_TAG)))?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes the document to `path`, readable and writable by the owner only.
    ///
    /// # Errors
    /// Serialization or I/O failures.
    pub fn write(&self, path: &Path) -> Result<(), XliffError> {
        let xml = self.to_xml()?;
        tracing::debug!(path = %path.display(), "Writing XLIFF file");
        write_owner_only(path, xml.as_bytes())
            .map_err(|source| XliffError::Io { path: path.to_path_buf(), source })
    }
}

fn unsupported_in_body(name: &str) -> XliffError {
    XliffError::Structure(format!("<{name}> inside <{BODY_TAG}> is not supported"))
}

fn read_unit(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<TransUnit, XliffError> {
    let attributes = read_attributes(start)?;
    let id = attribute(&attributes, "id").ok_or(XliffError::MissingUnitId)?.to_string();
    let mut source = None;
    let mut target = None;
    let mut annotations = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match element_name(&e)?.as_str() {
                SOURCE_TAG => source = Some(reader.read_text(e.name())?.into_owned()),
                TARGET_TAG => target = Some(reader.read_text(e.name())?.into_owned()),
                _ => annotations.push(Element::read(reader, &e)?),
            },
            Event::Empty(e) => match element_name(&e)?.as_str() {
                SOURCE_TAG => source = Some(String::new()),
                TARGET_TAG => target = Some(String::new()),
                _ => annotations.push(Element::from_empty(&e)?),
            },
            Event::End(_) => break,
            Event::Eof => {
                return Err(XliffError::Structure(format!(
                    "unexpected end of document inside translation unit '{id}'"
                )));
            }
            _ => {}
        }
    }

    let source = source.ok_or_else(|| XliffError::MissingSource { key: id.clone() })?;
    TransUnit::new(id, attributes, source, target, annotations)
}

fn write_unit<W: Write>(writer: &mut Writer<W>, unit: &TransUnit) -> Result<(), XliffError> {
    writer.write_event(Event::Start(start_tag(UNIT_TAG, unit.attributes())))?;
    write_raw_element(writer, SOURCE_TAG, unit.source_markup())?;
    if let Some(target) = unit.target_markup() {
        write_raw_element(writer, TARGET_TAG, target)?;
    }
    for annotation in unit.annotations() {
        annotation.write(writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(UNIT_TAG)))?;
    Ok(())
}

/// Writes `<name>markup</name>` on one line, `markup` as is.
fn write_raw_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    markup: &str,
) -> Result<(), XliffError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    // An empty text event keeps the end tag on the same line.
    writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(FILE_MODE))?;
    }

    Ok(())
}
