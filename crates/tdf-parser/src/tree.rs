//! Section tree produced by the parser.
//!
//! Every section lives in one arena owned by the [`Document`]; a parent
//! refers to its children by [`SectionId`]. A section does not know its own
//! name: the name is the key its parent stores it under. The root is always
//! the first entry of the arena.
//!
//! Fields and child sections keep insertion order. Replacing an existing
//! name keeps the original position. A replaced child section stays in the
//! arena but is no longer reachable from the root.
//!
//! Parsing, equality and dropping never recurse, so any nesting depth is
//! fine there. `Debug` and `Serialize` do recurse once per nesting level.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{ParseError, Parser, ParserConfig};

/// Index of a section in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(u32);

impl SectionId {
    fn new(index: usize) -> Self {
        SectionId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
struct SectionData {
    fields: IndexMap<String, String>,
    sections: IndexMap<String, SectionId>,
}

/// A parsed TDF document: the root section and everything under it.
#[derive(Debug, Clone)]
pub struct Document {
    sections: Vec<SectionData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only an empty root section.
    pub fn new() -> Self {
        Self {
            sections: vec![SectionData::default()],
        }
    }

    /// Parse source text with the default configuration.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Parser::parse(source, &ParserConfig::default())
    }

    /// Id of the root section.
    pub fn root_id(&self) -> SectionId {
        SectionId::new(0)
    }

    /// The root section.
    pub fn root(&self) -> Section<'_> {
        Section {
            doc: self,
            id: self.root_id(),
        }
    }

    /// Number of sections allocated, including the root and any that were
    /// replaced by a later section of the same name.
    pub fn allocated_sections(&self) -> usize {
        self.sections.len()
    }

    /// Create an empty section named `name` under `parent` and return its id.
    ///
    /// An existing child with the same name is replaced in place.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this document.
    pub fn insert_section(&mut self, parent: SectionId, name: impl Into<String>) -> SectionId {
        let id = SectionId::new(self.sections.len());
        self.sections.push(SectionData::default());
        self.sections[parent.index()].sections.insert(name.into(), id);
        id
    }

    /// Set field `key` of section `parent`, returning the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this document.
    pub fn insert_field(
        &mut self,
        parent: SectionId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.sections[parent.index()]
            .fields
            .insert(key.into(), value.into())
    }

    /// Whether `parent` already has a child section called `name`.
    pub fn has_section(&self, parent: SectionId, name: &str) -> bool {
        self.data(parent).sections.contains_key(name)
    }

    /// Whether `parent` already has a field called `key`.
    pub fn has_field(&self, parent: SectionId, key: &str) -> bool {
        self.data(parent).fields.contains_key(key)
    }

    fn data(&self, id: SectionId) -> &SectionData {
        &self.sections[id.index()]
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root()
    }
}

impl Eq for Document {}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

// ============================================================================
// Section (navigation handle)
// ============================================================================

/// A borrowed handle to one section of a [`Document`].
#[derive(Clone, Copy)]
pub struct Section<'doc> {
    doc: &'doc Document,
    id: SectionId,
}

impl<'doc> Section<'doc> {
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&'doc str, &'doc str)> + 'doc {
        self.doc
            .data(self.id)
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Child sections with their names, in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = (&'doc str, Section<'doc>)> + 'doc {
        let doc = self.doc;
        doc.data(self.id)
            .sections
            .iter()
            .map(move |(name, id)| (name.as_str(), Section { doc, id: *id }))
    }

    /// Value of field `key`.
    pub fn field(&self, key: &str) -> Option<&'doc str> {
        self.doc.data(self.id).fields.get(key).map(String::as_str)
    }

    /// Child section called `name`.
    pub fn section(&self, name: &str) -> Option<Section<'doc>> {
        self.doc.data(self.id).sections.get(name).map(|id| Section {
            doc: self.doc,
            id: *id,
        })
    }

    pub fn field_count(&self) -> usize {
        self.doc.data(self.id).fields.len()
    }

    pub fn section_count(&self) -> usize {
        self.doc.data(self.id).sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0 && self.section_count() == 0
    }
}

/// Structural equality: same fields and same child sections, in the same
/// order, all the way down. Walks an explicit stack of pairs.
impl PartialEq for Section<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(*self, *other)];
        while let Some((a, b)) = pending.pop() {
            if a.field_count() != b.field_count()
                || a.section_count() != b.section_count()
                || !a.fields().eq(b.fields())
            {
                return false;
            }
            for ((a_name, a_child), (b_name, b_child)) in a.sections().zip(b.sections()) {
                if a_name != b_name {
                    return false;
                }
                pending.push((a_child, b_child));
            }
        }
        true
    }
}

impl std::fmt::Debug for Section<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("fields", &Fields(*self))
            .field("sections", &Sections(*self))
            .finish()
    }
}

/// Serializes as `{ "fields": {...}, "sections": {...} }`.
impl Serialize for Section<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("fields", &Fields(*self))?;
        map.serialize_entry("sections", &Sections(*self))?;
        map.end()
    }
}

struct Fields<'doc>(Section<'doc>);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.fields())
    }
}

impl std::fmt::Debug for Fields<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.fields()).finish()
    }
}

struct Sections<'doc>(Section<'doc>);

impl Serialize for Sections<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.sections())
    }
}

impl std::fmt::Debug for Sections<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.sections()).finish()
    }
}
