//! In-progress comment text for one bug's comment form.
//!
//! The draft lives only in memory and is dropped with the form.

/// Draft comment text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft text with what the user typed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Reset the draft after a successful submission.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Whether the draft has nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// The exact text as typed, whitespace included.
    pub fn text(&self) -> &str {
        &self.text
    }
}
