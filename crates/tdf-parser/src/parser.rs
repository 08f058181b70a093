//! Single-pass TDF parser.
//!
//! Walks the source one character at a time with one character of
//! lookahead (for the `//` comment marker). An explicit stack of open
//! sections replaces recursion, so nesting depth is bounded only by memory.
//!
//! ```text
//! [Name] { key = value; [Child] { ... } }   // comment
//! ```

use crate::tree::{Document, SectionId};
use crate::{is_name_char, is_whitespace, EndOfInput, ParseError, ParseErrorKind, ParserConfig};

/// Where the scanner is within the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// At the top level or inside a section's `{ }`.
    Body,
    /// Inside `[ ]`.
    SectionNameStart,
    /// After `]`, waiting for `{`.
    SectionNameEnd,
    /// Reading a field key.
    FieldKeyStart,
    /// Whitespace seen after the key, waiting for `=`.
    FieldKeyEnd,
    /// After `=`, collecting the value up to `;`.
    FieldValueStart,
}

/// TDF source parser.
///
/// Builds a [`Document`] while scanning. The first invalid character aborts
/// the parse with a [`ParseError`] pointing at it.
pub struct Parser<'a> {
    source: &'a str,
    config: ParserConfig,
    doc: Document,
    stack: Vec<SectionId>,
    state: ParserState,
    in_comment: bool,
    section_name: String,
    field_key: String,
    field_value: String,
    // Position of the character being dispatched.
    pos: usize,
    row: usize,
    col: usize,
}

/// Parse `source` into a document.
pub fn parse(source: &str, config: &ParserConfig) -> Result<Document, ParseError> {
    Parser::parse(source, config)
}

impl<'a> Parser<'a> {
    /// Create a parser for the given source.
    pub fn new(source: &'a str, config: ParserConfig) -> Self {
        let doc = Document::new();
        let root = doc.root_id();
        Self {
            source,
            config,
            doc,
            stack: vec![root],
            state: ParserState::Body,
            in_comment: false,
            section_name: String::new(),
            field_key: String::new(),
            field_value: String::new(),
            pos: 0,
            row: 1,
            col: 1,
        }
    }

    /// Parse source text into a document.
    pub fn parse(source: &str, config: &ParserConfig) -> Result<Document, ParseError> {
        Parser::new(source, *config).run()
    }

    /// Parse with [`ParserConfig::default`].
    pub fn parse_default(source: &str) -> Result<Document, ParseError> {
        Self::parse(source, &ParserConfig::default())
    }

    /// Consume the whole source.
    pub fn run(mut self) -> Result<Document, ParseError> {
        tracing::debug!(len = self.source.len(), config = ?self.config, "parsing");

        let source = self.source;
        let mut chars = source.char_indices().peekable();
        let mut next_row = 1;
        let mut next_col = 1;

        while let Some((pos, ch)) = chars.next() {
            let next = chars.peek().map(|&(_, c)| c);

            self.pos = pos;
            self.row = next_row;
            self.col = next_col;

            if ch == '\n' {
                next_row += 1;
                next_col = 1;
                if self.in_comment {
                    self.in_comment = false;
                    continue;
                }
            } else {
                next_col += 1;
            }

            if self.in_comment {
                continue;
            }

            let comment_start = ch == '/' && next == Some('/');
            if comment_start {
                self.in_comment = true;
            }

            if let Err(err) = self.step(ch, comment_start) {
                tracing::debug!(
                    row = err.row,
                    col = err.col,
                    pos = err.pos,
                    reason = %err.kind,
                    "parse failed"
                );
                return Err(err);
            }
        }

        self.pos = source.len();
        self.row = next_row;
        self.col = next_col;
        self.finish()
    }

    /// Dispatch one character to the current state.
    fn step(&mut self, ch: char, comment_start: bool) -> Result<(), ParseError> {
        let whitespace = is_whitespace(ch);

        match self.state {
            ParserState::Body => {
                if whitespace || comment_start {
                    return Ok(());
                }
                match ch {
                    '[' => {
                        self.section_name.clear();
                        self.state = ParserState::SectionNameStart;
                    }
                    '}' => {
                        if self.in_root() {
                            return Err(self.error(ParseErrorKind::NothingToClose(ch)));
                        }
                        self.stack.pop();
                        tracing::trace!(depth = self.stack.len() - 1, "close section");
                    }
                    _ if is_name_char(ch) => {
                        if self.in_root() && !self.config.allow_root_fields {
                            return Err(self.error(ParseErrorKind::RootField));
                        }
                        self.field_key.clear();
                        self.field_key.push(ch);
                        self.field_value.clear();
                        self.state = ParserState::FieldKeyStart;
                    }
                    _ => return Err(self.error(ParseErrorKind::UnexpectedCharacter(ch))),
                }
            }

            ParserState::SectionNameStart => {
                if comment_start {
                    return Err(self.error(ParseErrorKind::CommentNotAllowed));
                }
                if whitespace {
                    if !self.section_name.is_empty() {
                        return Err(self.error(ParseErrorKind::WhitespaceInSectionName));
                    }
                    return Ok(());
                }
                match ch {
                    _ if is_name_char(ch) => self.section_name.push(ch),
                    ']' => self.open_section()?,
                    _ => return Err(self.error(ParseErrorKind::UnexpectedCharacter(ch))),
                }
            }

            ParserState::SectionNameEnd => {
                if whitespace || comment_start {
                    return Ok(());
                }
                match ch {
                    '{' => self.state = ParserState::Body,
                    _ => return Err(self.error(ParseErrorKind::UnexpectedCharacter(ch))),
                }
            }

            ParserState::FieldKeyStart => {
                if comment_start {
                    return Err(self.error(ParseErrorKind::CommentNotAllowed));
                }
                if whitespace {
                    self.state = ParserState::FieldKeyEnd;
                    return Ok(());
                }
                match ch {
                    '=' => self.state = ParserState::FieldValueStart,
                    _ if is_name_char(ch) => self.field_key.push(ch),
                    _ => return Err(self.error(ParseErrorKind::UnexpectedCharacter(ch))),
                }
            }

            ParserState::FieldKeyEnd => {
                if comment_start {
                    return Err(self.error(ParseErrorKind::CommentNotAllowed));
                }
                if whitespace {
                    return Ok(());
                }
                match ch {
                    '=' => self.state = ParserState::FieldValueStart,
                    _ if is_name_char(ch) => {
                        return Err(self.error(ParseErrorKind::WhitespaceInFieldKey(ch)));
                    }
                    _ => return Err(self.error(ParseErrorKind::UnexpectedCharacter(ch))),
                }
            }

            ParserState::FieldValueStart => {
                if comment_start {
                    return Err(self.error(ParseErrorKind::CommentNotAllowed));
                }
                match ch {
                    ';' => self.commit_field()?,
                    '\n' => return Err(self.error(ParseErrorKind::MissingSemicolon)),
                    _ => self.field_value.push(ch),
                }
            }
        }

        Ok(())
    }

    /// `]` closed a section header: register the section and make it current.
    fn open_section(&mut self) -> Result<(), ParseError> {
        let parent = self.current();
        if !self.config.allow_name_overrides && self.doc.has_section(parent, &self.section_name) {
            let name = std::mem::take(&mut self.section_name);
            return Err(self.error(ParseErrorKind::DuplicateSection(name)));
        }

        let name = std::mem::take(&mut self.section_name);
        tracing::trace!(name = %name, depth = self.stack.len(), "open section");
        let id = self.doc.insert_section(parent, name);
        self.stack.push(id);
        self.state = ParserState::SectionNameEnd;
        Ok(())
    }

    /// `;` ended a value: store the field in the current section.
    fn commit_field(&mut self) -> Result<(), ParseError> {
        let section = self.current();
        let key = std::mem::take(&mut self.field_key);
        let mut value = std::mem::take(&mut self.field_value);
        if self.config.auto_trim_value_string {
            value = value.trim_matches(is_whitespace).to_string();
        }

        if !self.config.allow_name_overrides && self.doc.has_field(section, &key) {
            return Err(self.error(ParseErrorKind::DuplicateField(key)));
        }

        tracing::trace!(key = %key, value = %value, "field");
        self.doc.insert_field(section, key, value);
        self.state = ParserState::Body;
        Ok(())
    }

    /// Source exhausted: anything still open is an error.
    fn finish(self) -> Result<Document, ParseError> {
        let open = match self.state {
            ParserState::Body if self.stack.len() > 1 => {
                Some(EndOfInput::UnclosedSections(self.stack.len() - 1))
            }
            ParserState::Body => None,
            ParserState::SectionNameStart => Some(EndOfInput::SectionHeader),
            ParserState::SectionNameEnd => Some(EndOfInput::SectionBody),
            ParserState::FieldKeyStart
            | ParserState::FieldKeyEnd
            | ParserState::FieldValueStart => Some(EndOfInput::Field),
        };

        if let Some(what) = open {
            let err = self.error(ParseErrorKind::UnexpectedEndOfInput(what));
            tracing::debug!(
                row = err.row,
                col = err.col,
                pos = err.pos,
                reason = %err.kind,
                "unexpected end of input"
            );
            return Err(err);
        }

        tracing::debug!(sections = self.doc.allocated_sections(), "parsed");
        Ok(self.doc)
    }

    // --- Helpers ---

    fn current(&self) -> SectionId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root_id())
    }

    fn in_root(&self) -> bool {
        self.stack.len() == 1
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            row: self.row,
            col: self.col,
            pos: self.pos,
        }
    }
}
