//! Line text cleanup.
//!
//! Strips invisible zero-width and bidirectional formatting characters from
//! dialogue text before it becomes an output line key or value.

/// Invisible formatting code points removed by [`sanitize`].
///
/// U+200D (zero-width joiner) is kept; emoji sequences depend on it.
const STRIPPED: &[(char, char)] = &[
    ('\u{200B}', '\u{200C}'),
    ('\u{200E}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{2069}'),
    ('\u{FEFF}', '\u{FEFF}'),
];

fn is_stripped(ch: char) -> bool {
    STRIPPED.iter().any(|&(lo, hi)| (lo..=hi).contains(&ch))
}

/// Remove invisible formatting characters, leaving everything else intact.
///
/// ```
/// use dialogue_convert::sanitize;
///
/// assert_eq!(sanitize("Hi\u{200B} there\u{FEFF}!"), "Hi there!");
/// assert_eq!(sanitize("Hello"), "Hello");
/// ```
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|&ch| !is_stripped(ch)).collect()
}

/// True when [`sanitize`] would change `text`.
pub fn needs_sanitizing(text: &str) -> bool {
    text.chars().any(is_stripped)
}
