//! `src/model/filter.rs`
//!
//! Search-box filtering of candidate base names.
//!
//! Pattern grammar (case-insensitive):
//! - `name` matches base names containing `name`
//! - `*name` / `name*` / `*name*` anchor to the end / start / neither
//! - `name.ext` additionally requires the extension to contain `ext`
//!   (`*` inside the extension part is ignored)
//! - without a `.`, only [`MEDIA_EXTENSIONS`] pass

/// Extensions treated as media. Also the allow-list applied when a pattern
/// carries no extension filter.
pub const MEDIA_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "mp4", "mpg", "mov"];

/// Extension of caption files.
pub const TEXT_EXTENSION: &str = "txt";

#[inline]
#[must_use]
pub fn is_media_extension(ext: &str) -> bool {
    MEDIA_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext))
}

#[inline]
#[must_use]
pub fn is_text_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case(TEXT_EXTENSION)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameMatch {
    Contains(String),
    Prefix(String),
    Suffix(String),
}

/// A parsed, case-folded filter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPattern {
    name: NameMatch,
    extension: Option<String>,
}

impl FilterPattern {
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.to_lowercase();

        // Segments past the second dot are ignored
        let mut parts = pattern.split('.');
        let name_part = parts.next().unwrap_or_default();
        let extension = parts.next().map(|ext| ext.replace('*', ""));

        let leading = name_part.starts_with('*');
        let trailing = name_part.len() > 1 && name_part.ends_with('*');
        let needle = name_part.replace('*', "");

        let name = match (leading, trailing) {
            (true, false) => NameMatch::Suffix(needle),
            (false, true) => NameMatch::Prefix(needle),
            _ => NameMatch::Contains(needle),
        };

        Self { name, extension }
    }

    /// `extension` is the candidate's extension without the dot.
    #[must_use]
    pub fn matches(&self, base_name: &str, extension: &str) -> bool {
        let extension = extension.to_lowercase();

        let extension_ok = match &self.extension {
            Some(filter) => extension.contains(filter.as_str()),
            None => is_media_extension(&extension),
        };
        if !extension_ok {
            return false;
        }

        let base_name = base_name.to_lowercase();
        match &self.name {
            NameMatch::Contains(needle) => base_name.contains(needle.as_str()),
            NameMatch::Prefix(needle) => base_name.starts_with(needle.as_str()),
            NameMatch::Suffix(needle) => base_name.ends_with(needle.as_str()),
        }
    }
}

/// One-shot form of [`FilterPattern::parse`] + [`FilterPattern::matches`].
#[must_use]
pub fn passes_filter(base_name: &str, extension: &str, pattern: &str) -> bool {
    FilterPattern::parse(pattern).matches(base_name, extension)
}
