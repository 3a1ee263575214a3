//! Path expression lexer

/// Path expression token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Star,        // *
    Eq,          // =
    NotEq,       // !=
    Comma,       // ,

    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    Literal(String),
    Number(f64),

    /// NCName, `prefix:local` or `prefix:*`
    Name(String),
}

/// Split an expression into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&c) = chars.get(pos) {
        let next = chars.get(pos + 1).copied();

        match c {
            c if c.is_whitespace() => pos += 1,
            '/' if next == Some('/') => {
                tokens.push(Token::DoubleSlash);
                pos += 2;
            },
            '/' => {
                tokens.push(Token::Slash);
                pos += 1;
            },
            '.' if next == Some('.') => {
                tokens.push(Token::DoubleDot);
                pos += 2;
            },
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                let (number, end) = read_number(&chars, pos)?;
                tokens.push(Token::Number(number));
                pos = end;
            },
            '.' => {
                tokens.push(Token::Dot);
                pos += 1;
            },
            '!' if next == Some('=') => {
                tokens.push(Token::NotEq);
                pos += 2;
            },
            '@' | '*' | '=' | ',' | '(' | ')' | '[' | ']' => {
                tokens.push(match c {
                    '@' => Token::At,
                    '*' => Token::Star,
                    '=' => Token::Eq,
                    ',' => Token::Comma,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    '[' => Token::LeftBracket,
                    _ => Token::RightBracket,
                });
                pos += 1;
            },
            '\'' | '"' => {
                let close = chars[pos + 1..]
                    .iter()
                    .position(|&other| other == c)
                    .ok_or_else(|| format!("unterminated string literal at offset {}", pos))?;
                let literal: String = chars[pos + 1..pos + 1 + close].iter().collect();
                tokens.push(Token::Literal(literal));
                pos += close + 2;
            },
            c if c.is_ascii_digit() => {
                let (number, end) = read_number(&chars, pos)?;
                tokens.push(Token::Number(number));
                pos = end;
            },
            c if is_name_start(c) => {
                let (name, end) = read_name(&chars, pos);
                tokens.push(Token::Name(name));
                pos = end;
            },
            other => return Err(format!("unexpected character '{}' at offset {}", other, pos)),
        }
    }

    Ok(tokens)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn read_name(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while chars.get(end).is_some_and(|&c| is_name_char(c)) {
        end += 1;
    }

    // prefix:local or prefix:*, never the `::` axis separator
    if chars.get(end) == Some(&':') {
        match chars.get(end + 1) {
            Some('*') => end += 2,
            Some(&c) if is_name_start(c) => {
                end += 1;
                while chars.get(end).is_some_and(|&c| is_name_char(c)) {
                    end += 1;
                }
            },
            _ => {},
        }
    }

    (chars[start..end].iter().collect(), end)
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), String> {
    let mut end = start;
    while chars
        .get(end)
        .is_some_and(|&c| c.is_ascii_digit() || c == '.')
    {
        end += 1;
    }

    let text: String = chars[start..end].iter().collect();
    text.parse::<f64>()
        .map(|number| (number, end))
        .map_err(|_| format!("invalid number '{}'", text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_path_with_predicate() {
        let tokens = tokenize("pkp:publication/pkp:id[text() = '12']/..").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("pkp:publication".into()),
                Token::Slash,
                Token::Name("pkp:id".into()),
                Token::LeftBracket,
                Token::Name("text".into()),
                Token::LeftParen,
                Token::RightParen,
                Token::Eq,
                Token::Literal("12".into()),
                Token::RightBracket,
                Token::Slash,
                Token::DoubleDot,
            ]
        );
    }

    #[test]
    fn test_tokenize_descendant_attribute() {
        let tokens = tokenize("//@locale").unwrap();
        assert_eq!(tokens, vec![Token::DoubleSlash, Token::At, Token::Name("locale".into())]);
    }

    #[test]
    fn test_tokenize_names_and_numbers() {
        let tokens = tokenize("normalize-space(pkp:*) != 1.5").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("normalize-space".into()),
                Token::LeftParen,
                Token::Name("pkp:*".into()),
                Token::RightParen,
                Token::NotEq,
                Token::Number(1.5),
            ]
        );
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(tokenize("pkp:title[@locale = 'en]").is_err());
        assert!(tokenize("a # b").is_err());
        assert!(tokenize("1.2.3").is_err());
    }
}
