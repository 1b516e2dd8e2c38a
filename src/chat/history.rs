//! Chat entries and history.

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub question: String,
    pub answer: String,
}

impl ChatEntry {
    /// Entry for a question whose answer has not arrived yet.
    pub fn pending(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
        }
    }
}

/// Ordered chat history.
///
/// Append-only, except that the answer of the last entry is written when its
/// stream completes.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    /// Overwrite the answer of the newest entry. No-op on an empty history.
    pub fn set_last_answer(&mut self, answer: impl Into<String>) -> bool {
        match self.entries.last_mut() {
            Some(entry) => {
                entry.answer = answer.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatEntry;
    type IntoIter = std::slice::Iter<'a, ChatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
