use unicode_normalization::UnicodeNormalization;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 100;

/// Derives a URL-safe path segment from a title.
///
/// Accented characters decompose to their ASCII base letter; characters with
/// no ASCII form are dropped. The result is lowercase, uses `-` between
/// words, holds only `[a-z0-9_-]` and is at most [`MAX_SLUG_LEN`] long.
///
/// The function is total. Titles made only of symbols or non-Latin script
/// produce an empty string, which callers must handle.
///
/// # Examples
///
/// ```
/// use clubfeed::util::slugify;
///
/// assert_eq!(slugify("Mi Título Con Ñ"), "mi-titulo-con-n");
/// assert_eq!(slugify("  ¡Gol!  -- de  Instituto "), "gol-de-instituto");
/// assert_eq!(slugify("🔥🔥"), "");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;

    for c in title.nfkd().filter(char::is_ascii) {
        if c.is_ascii_whitespace() || c == '\x0b' || c == '-' {
            pending_sep = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        }
        // Anything else is removed without breaking the current word.
    }

    // The slug is pure ASCII, so byte length equals character count.
    slug.truncate(MAX_SLUG_LEN);
    slug.trim_matches('-').to_string()
}
