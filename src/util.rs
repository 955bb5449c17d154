//! Shared text helpers.

/// Strip `[[target]]` / `[[target][description]]` bracket-link decoration
/// from a filename, returning the bare target.
pub fn strip_link_decoration(name: &str) -> &str {
    let name = name.trim();
    let Some(inner) = name.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) else {
        return name;
    };
    match inner.find("][") {
        Some(split) => &inner[..split],
        None => inner,
    }
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_pass_through() {
        assert_eq!(strip_link_decoration("fig.pdf"), "fig.pdf");
        assert_eq!(strip_link_decoration("  fig.pdf "), "fig.pdf");
    }

    #[test]
    fn bracket_links_are_stripped() {
        assert_eq!(strip_link_decoration("[[fig.pdf]]"), "fig.pdf");
        assert_eq!(strip_link_decoration("[[fig.pdf][figure 1]]"), "fig.pdf");
    }

    #[test]
    fn word_counting() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  a\tb\nc  "), 3);
    }
}
