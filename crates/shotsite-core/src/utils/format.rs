use std::sync::LazyLock;

use regex::{Captures, Regex};

static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").expect("bold regex is valid"));

static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^\n]+?)__").expect("bold regex is valid"));

/// A lone `*` pair. Group 1 is the character before the opener, group 3 the
/// character after the closer; neither may be another `*`.
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^*])\*([^*\n](?:[^\n]*?[^*\n])??)\*([^*]|$)").expect("italic regex is valid")
});

/// A lone `_` pair that is not inside a word, so `snake_case` survives.
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9])_([^_\n](?:[^\n]*?[^_\n])??)_([^A-Za-z0-9_]|$)")
        .expect("italic regex is valid")
});

/// Convert CMS rich text to HTML.
///
/// Handles `**bold**`, `__bold__`, `*italic*`, `_italic_` and newlines.
/// Inline HTML already present in the text passes through untouched.
/// Emphasis never spans lines.
pub fn render_rich_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let html = BOLD_STARS.replace_all(text, "<strong>$1</strong>");
    let html = BOLD_UNDERSCORES.replace_all(&html, "<strong>$1</strong>");
    let html = wrap_bounded(&html, &ITALIC_STAR, "em");
    let html = wrap_bounded(&html, &ITALIC_UNDERSCORE, "em");
    html.replace('\n', "<br>")
}

/// Wrap group 2 of every match in `<tag>`, keeping the boundary characters
/// in groups 1 and 3. The trailing boundary is not consumed, so it can open
/// the next match.
fn wrap_bounded(text: &str, re: &Regex, tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    while let Some(caps) = re.captures_at(text, last) {
        let (start, end) = span(&caps);
        out.push_str(&text[last..start]);
        out.push_str(caps.get(1).map_or("", |m| m.as_str()));
        out.push_str(&format!("<{tag}>{}</{tag}>", &caps[2]));
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Start of the whole match and end of the closing delimiter.
fn span(caps: &Captures<'_>) -> (usize, usize) {
    let start = caps.get(0).map_or(0, |m| m.start());
    let end = caps.get(3).map_or_else(|| caps.get(0).map_or(0, |m| m.end()), |m| m.start());
    (start, end)
}
