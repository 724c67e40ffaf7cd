//! The staged change set handed to the pipeline.

/// Staged file paths plus the patch text describing them.
///
/// `files` keeps the order git reported. `patch` may have been cut to a
/// byte budget; `truncated` records whether that happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub files: Vec<String>,
    pub patch: String,
    pub truncated: bool,
}

impl ChangeSet {
    pub fn new(files: Vec<String>, patch: impl Into<String>) -> Self {
        Self {
            files,
            patch: patch.into(),
            truncated: false,
        }
    }

    /// `true` when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Cut `patch` to at most `max_bytes`, backing off to a char boundary.
    pub fn truncate_patch(&mut self, max_bytes: usize) {
        if self.patch.len() <= max_bytes {
            return;
        }
        let cut = floor_char_boundary(&self.patch, max_bytes);
        self.patch.truncate(cut);
        self.truncated = true;
    }
}

/// Largest index `<= max` that lies on a char boundary of `s`.
pub fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
