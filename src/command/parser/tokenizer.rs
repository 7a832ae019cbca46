//! Quote- and escape-aware splitting of command text.

/// Splits input on whitespace outside single or double quotes.
///
/// A backslash escapes the following character both inside and outside
/// quotes. An unterminated quote consumes the rest of the input, and a
/// quoted empty string (`""`) yields an empty token.
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut has_token = false;
    let mut in_quotes: Option<char> = None;
    let mut escaped = false;

    for character in input.chars() {
        if escaped {
            current.push(character);
            has_token = true;
            escaped = false;
            continue;
        }

        if let Some(quote_char) = in_quotes {
            match character {
                '\\' => escaped = true,
                _ if character == quote_char => in_quotes = None,
                _ => current.push(character),
            }
            continue;
        }

        match character {
            '"' | '\'' => {
                in_quotes = Some(character);
                has_token = true;
            }
            '\\' => escaped = true,
            _ if character.is_whitespace() => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            _ => {
                current.push(character);
                has_token = true;
            }
        }
    }

    if escaped {
        current.push('\\');
        has_token = true;
    }
    if has_token {
        tokens.push(current);
    }

    tokens
}
