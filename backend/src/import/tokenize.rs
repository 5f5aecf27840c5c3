use common::model::csv::Delimiter;

/// Splits one line into fields.
///
/// A `""` pair is a literal quote. A lone `"` flips the quoted state and is
/// kept until the field is cleaned; the delimiter only splits outside quotes.
/// Unterminated quotes are accepted: the line simply ends inside them.
pub fn tokenize_row(line: &str, delimiter: Delimiter) -> Vec<String> {
    let delimiter = delimiter.as_char();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                current.push('"');
            } else {
                in_quotes = !in_quotes;
                current.push('"');
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(clean_field(&current));
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(clean_field(&current));

    fields
}

/// Trims a raw field and drops one enclosing quote on each side.
fn clean_field(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_delimiters_and_escaped_quotes() {
        let fields = tokenize_row(r#""Smith, John";42;"Says ""hi""""#, Delimiter::Semicolon);
        assert_eq!(fields, vec!["Smith, John", "42", r#"Says "hi""#]);
    }

    #[test]
    fn quoted_semicolon_with_comma_delimiter() {
        let fields = tokenize_row(r#"a,"b;c, d",e"#, Delimiter::Comma);
        assert_eq!(fields, vec!["a", "b;c, d", "e"]);
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(tokenize_row(",,", Delimiter::Comma), vec!["", "", ""]);
        assert_eq!(tokenize_row("", Delimiter::Comma), vec![""]);
        assert_eq!(tokenize_row(r#""""#, Delimiter::Comma), vec![""]);
    }

    #[test]
    fn whitespace_is_trimmed_around_quotes() {
        let fields = tokenize_row(r#"  "Ana Souza" ;  12 "#, Delimiter::Semicolon);
        assert_eq!(fields, vec!["Ana Souza", "12"]);
    }

    #[test]
    fn unterminated_quote_swallows_rest_of_line() {
        let fields = tokenize_row(r#"a,"b,c"#, Delimiter::Comma);
        assert_eq!(fields, vec!["a", "b,c"]);
    }
}
