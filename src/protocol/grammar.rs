//! Grammar primitives
//!
//! Character classes and small scanners shared by the command, request and
//! reply parsers. Every scanner works on `&str` slices and hands back the
//! unconsumed remainder so parsers can be written as a chain of steps.

/// `<a>`: one of the 52 ASCII letters.
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// `<d>`: one of the ten ASCII digits.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// `<let-dig-hyp>`
pub fn is_let_dig_hyp(c: char) -> bool {
    is_letter(c) || is_digit(c) || c == '-'
}

/// Printable ASCII, space through tilde.
pub fn is_printable(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Splits `input` after the longest prefix whose characters satisfy `pred`.
pub fn take_while(input: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = input.find(|c| !pred(c)).unwrap_or(input.len());
    input.split_at(end)
}

/// `<SP>+`: consumes one or more spaces. Returns `None` when `input` does not
/// start with a space.
pub fn skip_spaces(input: &str) -> Option<&str> {
    if !input.starts_with(' ') {
        return None;
    }
    Some(input.trim_start_matches(' '))
}

/// Parses a non-empty all-digit string whose value does not exceed `max`.
///
/// Leading zeros are accepted here; grammars that forbid them check the
/// digit string themselves.
pub fn decimal(digits: &str, max: u32) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(is_digit) {
        return None;
    }
    let mut value: u32 = 0;
    for c in digits.chars() {
        value = value.checked_mul(10)?.checked_add(c.to_digit(10)?)?;
        if value > max {
            return None;
        }
    }
    Some(value)
}

/// `<string>`: a non-empty run made only of printable characters.
pub fn printable_string(input: &str) -> Option<&str> {
    if !input.is_empty() && input.chars().all(is_printable) {
        Some(input)
    } else {
        None
    }
}

/// Outcome of matching the leading word of a line against a vocabulary.
#[derive(Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// A vocabulary token, and the rest of the line starting at the first space.
    Known(&'static str, &'a str),
    /// The line starts with a vocabulary token glued to further text.
    Glued(&'static str),
    Unknown,
}

/// Matches the word before the first space case-insensitively against
/// `vocabulary`.
pub fn match_token<'a>(body: &'a str, vocabulary: &[&'static str]) -> Token<'a> {
    let end = body.find(' ').unwrap_or(body.len());
    let (word, rest) = body.split_at(end);

    if let Some(token) = vocabulary.iter().copied().find(|t| t.eq_ignore_ascii_case(word)) {
        return Token::Known(token, rest);
    }

    vocabulary
        .iter()
        .copied()
        .find(|t| {
            word.len() > t.len()
                && word
                    .get(..t.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(t))
        })
        .map_or(Token::Unknown, Token::Glued)
}

/// Removes the trailing CRLF, returning `None` if the line is not terminated
/// by exactly `\r\n`.
pub fn strip_crlf(line: &str) -> Option<&str> {
    line.strip_suffix("\r\n")
}

/// Normalizes a requested pathname: backslashes become forward slashes and a
/// single leading slash is dropped, so paths are always relative.
pub fn normalize_pathname(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_classes() {
        assert!(is_letter('a') && is_letter('Z'));
        assert!(!is_letter('1'));
        assert!(is_let_dig_hyp('-') && is_let_dig_hyp('7'));
        assert!(!is_let_dig_hyp('.'));
        assert!(is_printable(' ') && is_printable('~'));
        assert!(!is_printable('\r') && !is_printable('\u{7f}') && !is_printable('é'));
    }

    #[test]
    fn test_skip_spaces() {
        assert_eq!(skip_spaces("   abc"), Some("abc"));
        assert_eq!(skip_spaces(" abc"), Some("abc"));
        assert_eq!(skip_spaces("abc"), None);
        assert_eq!(skip_spaces(""), None);
    }

    #[test]
    fn test_decimal_limits() {
        assert_eq!(decimal("255", 255), Some(255));
        assert_eq!(decimal("256", 255), None);
        assert_eq!(decimal("007", 255), Some(7));
        assert_eq!(decimal("", 255), None);
        assert_eq!(decimal("1a", 255), None);
        assert_eq!(decimal("99999999999999999999", u32::MAX), None);
    }

    #[test]
    fn test_take_while_splits_at_first_mismatch() {
        assert_eq!(take_while("abc-1.x", is_let_dig_hyp), ("abc-1", ".x"));
        assert_eq!(take_while("", is_digit), ("", ""));
    }

    #[test]
    fn test_match_token() {
        let vocabulary = ["USER", "QUIT"];
        assert_eq!(
            match_token("user  bob", &vocabulary),
            Token::Known("USER", "  bob")
        );
        assert_eq!(match_token("QUIT", &vocabulary), Token::Known("QUIT", ""));
        assert_eq!(match_token("USERbob", &vocabulary), Token::Glued("USER"));
        assert_eq!(match_token("LIST", &vocabulary), Token::Unknown);
        assert_eq!(match_token("US", &vocabulary), Token::Unknown);
    }

    #[test]
    fn test_normalize_pathname() {
        assert_eq!(normalize_pathname("/a/b.txt"), "a/b.txt");
        assert_eq!(normalize_pathname("\\a\\b.txt"), "a/b.txt");
        assert_eq!(normalize_pathname("//a"), "/a");
        assert_eq!(normalize_pathname("a/b"), "a/b");
    }
}
