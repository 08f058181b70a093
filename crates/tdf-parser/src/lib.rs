//! TDF Parser
//!
//! Parses TDF source text into a tree of sections in a single forward pass.
//! A TDF file is a nest of `[Name] { ... }` sections holding `key = value;`
//! fields, with `//` line comments. Field values are kept as raw strings.
//!
//! Parsing, comparing and dropping a [`Document`] never recurse, whatever the
//! nesting depth. `Debug` and `Serialize` recurse once per nesting level.
//!
//! # Example
//!
//! ```
//! use tdf_parser::Parser;
//!
//! let doc = Parser::parse_default("[SERVER] { PORT = 8080; }").unwrap();
//! let server = doc.root().section("SERVER").unwrap();
//! assert_eq!(server.field("PORT"), Some("8080"));
//! ```

pub mod config;
pub mod parser;
pub mod tree;

pub use config::ParserConfig;
pub use parser::{parse, Parser};
pub use tree::{Document, Section, SectionId};

/// Returns true for characters allowed in section names and field keys.
pub fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Whitespace as the format sees it: Unicode whitespace plus the byte-order
/// mark, so a BOM-prefixed file reads the same as one without.
pub fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{feff}'
}

/// Parser error with position information.
///
/// `row` and `col` are 1-based and count characters; `pos` is the 0-based
/// byte offset of the offending character in the source, so
/// `&source[err.pos..]` starts at it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error at line {row}, column {col}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub row: usize,
    pub col: usize,
    pub pos: usize,
}

impl ParseError {
    /// Human-readable cause, without the position prefix.
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}

/// What went wrong at the reported position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),

    #[error("Nothing to close: {0}")]
    NothingToClose(char),

    #[error("Can't add fields to the root.")]
    RootField,

    #[error("Cannot start a comment here.")]
    CommentNotAllowed,

    #[error("Cannot have whitespace inside section header name.")]
    WhitespaceInSectionName,

    #[error("Field keys cannot have whitespace. Trying to add char after whitespace: {0}")]
    WhitespaceInFieldKey(char),

    #[error("Missing \";\" before line end.")]
    MissingSemicolon,

    #[error("A section with name \"{0}\" already exists inside the current parent.")]
    DuplicateSection(String),

    #[error("A key with name \"{0}\" already exists inside the current section.")]
    DuplicateField(String),

    #[error("Unexpected end of input: {0}")]
    UnexpectedEndOfInput(EndOfInput),
}

/// The construct left open when the source ran out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndOfInput {
    #[error("unterminated section header.")]
    SectionHeader,

    #[error("missing '{{' after section header.")]
    SectionBody,

    #[error("unterminated field.")]
    Field,

    #[error("{0} unclosed section(s).")]
    UnclosedSections(usize),
}
