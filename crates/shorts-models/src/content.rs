//! Prompts and narration script.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Idea offered by the "example" helper.
pub const EXAMPLE_IDEA: &str = "5 most beautiful waterfalls in the world";

/// One image prompt. Position is meaningful: it is the narration order and
/// the default video order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Prompt {
    /// 0-based slot index, stable once created
    pub index: usize,
    /// Prompt text, replaced wholesale on regeneration
    pub text: String,
}

impl Prompt {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Build an ordered prompt list from raw strings.
    pub fn from_texts<I, S>(texts: I) -> Vec<Prompt>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| Prompt::new(i, t))
            .collect()
    }

    /// Display label, numbered from 1 (e.g. `"2. Angel Falls ..."`).
    pub fn label(&self) -> String {
        format!("{}. {}", self.index + 1, self.text)
    }
}

/// Narration script with an unsaved-edits flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Script {
    pub text: String,
    /// Unsaved edits present
    pub dirty: bool,
}

impl Script {
    /// A freshly generated script (not dirty).
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dirty: false,
        }
    }

    /// Replace the text with a user edit.
    ///
    /// Returns true when the trimmed text actually changed, which is what
    /// makes an existing voiceover stale.
    pub fn edit(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let changed = text.trim() != self.text.trim();
        self.text = text;
        self.dirty = true;
        changed
    }

    /// Mark current edits as saved.
    pub fn save(&mut self) {
        self.dirty = false;
    }

    /// Text sent to the voiceover service.
    pub fn narration(&self) -> &str {
        self.text.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.narration().is_empty()
    }
}
