use std::path::PathBuf;

// -----------------------------------------------------------------------------
// Strictness

/// What the reader does when one field holds bad data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strictness {
    /// Log the error and keep the field's default value.
    #[default]
    Lenient,
    /// Abort the read.
    Strict,
}

// -----------------------------------------------------------------------------
// ClassifyOptions

/// Settings shared by one read or write call and every satellite it touches.
///
/// # Examples
///
/// ```
/// use classify_engine::{ClassifyOptions, Strictness};
///
/// let options = ClassifyOptions::default()
///     .with_strictness(Strictness::Strict)
///     .with_max_depth(64);
///
/// assert!(options.references);
/// assert_eq!(options.max_depth, Some(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub strictness: Strictness,
    /// Emit `ref`/`refid` markers for shared instances. Readers always honor
    /// markers found in the input.
    pub references: bool,
    /// Directory holding satellite files of follow-id fields.
    pub base_dir: Option<PathBuf>,
    /// Maximum nesting depth, unbounded when `None`.
    pub max_depth: Option<usize>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            references: true,
            base_dir: None,
            max_depth: None,
        }
    }
}

impl ClassifyOptions {
    #[inline]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[inline]
    pub fn with_references(mut self, references: bool) -> Self {
        self.references = references;
        self
    }

    #[inline]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}
