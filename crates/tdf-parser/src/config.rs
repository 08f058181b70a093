use serde::{Deserialize, Serialize};

/// Options controlling how strictly source text is accepted.
///
/// Deserializing from a partial object (e.g. `{"allowRootFields": true}`)
/// fills the missing options from [`ParserConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    /// Accept `key = value;` directly at the top level.
    pub allow_root_fields: bool,
    /// Trim surrounding whitespace from field values.
    pub auto_trim_value_string: bool,
    /// Let a repeated section or field name replace the earlier one
    /// instead of failing.
    pub allow_name_overrides: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_root_fields: false,
            auto_trim_value_string: true,
            allow_name_overrides: false,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_root_fields(mut self, allow: bool) -> Self {
        self.allow_root_fields = allow;
        self
    }

    pub fn auto_trim_value_string(mut self, trim: bool) -> Self {
        self.auto_trim_value_string = trim;
        self
    }

    pub fn allow_name_overrides(mut self, allow: bool) -> Self {
        self.allow_name_overrides = allow;
        self
    }
}
