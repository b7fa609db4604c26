use crate::news::story::Story;

/// Current story list plus the selected entry.
///
/// The selection, when present, always indexes into `stories`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    stories: Vec<Story>,
    selected: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list and select its first element, if any.
    pub fn load(&mut self, stories: Vec<Story>) {
        self.selected = if stories.is_empty() { None } else { Some(0) };
        self.stories = stories;
    }

    /// Select `story` if it is a member of the current list. Non-members leave the selection
    /// untouched and return `false`.
    pub fn select(&mut self, story: &Story) -> bool {
        match self.stories.iter().position(|s| s == story) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn select_id(&mut self, id: &str) -> bool {
        match self.stories.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&Story> {
        self.selected.and_then(|idx| self.stories.get(idx))
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/news/selection.rs"]
mod tests;
