use regex::Regex;

/// Normalizes free-form customer input: strips control characters, trims
/// whitespace, and escapes markup so stored text is inert when echoed back.
pub fn sanitize(input: &str) -> String {
    let control = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
    let s = control.replace_all(input, "").into_owned();

    s.trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

pub fn is_valid_email(email: &str) -> bool {
    let grammar = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    grammar.is_match(email)
}
