use ammonia::Builder;
use std::collections::HashSet;

/// Maximum length of a stored display name, in characters.
pub const MAX_NAME_CHARS: usize = 80;

/// Strips every HTML tag from a user-supplied display name.
///
/// Names are echoed into the public share record and the parent dashboard,
/// so no markup is allowed at all. Returns `None` if nothing printable is left.
pub fn clean_display_name(input: &str) -> Option<String> {
    let cleaned = Builder::default()
        .tags(HashSet::new())
        .clean(input)
        .to_string();

    let trimmed: String = cleaned.trim().chars().take(MAX_NAME_CHARS).collect();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_kept() {
        assert_eq!(clean_display_name("  Asha  ").as_deref(), Some("Asha"));
    }

    #[test]
    fn markup_is_removed() {
        assert_eq!(
            clean_display_name("<b>Asha</b><script>alert(1)</script>").as_deref(),
            Some("Asha")
        );
    }

    #[test]
    fn empty_after_cleaning_is_none() {
        assert!(clean_display_name("<img src=x>").is_none());
    }
}
