//! Apex tokenizer
//!
//! Keywords are not special-cased here: Apex keywords are case-insensitive
//! and several of them (`new`, `delete`, `update`) are also legal member
//! names, so the parser decides from context.

use crate::features::parsing::domain::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    StringLiteral(String),
    IntegerLiteral(i64),
    LongLiteral(i64),
    DecimalLiteral(String),
    /// Inline SOQL/SOSL query, brackets stripped
    Soql(String),
    Annotation(String),
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(q) if *q == p)
    }

    /// Case-insensitive keyword check
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(id) if id.eq_ignore_ascii_case(kw))
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

// Longest first so `==` wins over `=`
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "=>",
    "(", ")", "{", "}", "[", "]", ";", ",", ".", "=", "<", ">", "+", "-", "*", "/", "!", "?",
    ":", "&", "|", "^", "%",
];

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    rest: &'a str,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            rest: input,
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest.chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.rest = &self.rest[ch.len_utf8()..];
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }
}

/// Tokenize a compilation unit; `unit` names the source in errors
pub fn tokenize(unit: &str, input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor::new(input);

    while let Some(ch) = cursor.peek() {
        let (line, column) = (cursor.line, cursor.column);

        if ch.is_whitespace() {
            cursor.bump();
            continue;
        }

        if cursor.starts_with("//") {
            while let Some(c) = cursor.peek() {
                if c == '\n' {
                    break;
                }
                cursor.bump();
            }
            continue;
        }

        if cursor.starts_with("/*") {
            cursor.bump();
            cursor.bump();
            loop {
                if cursor.starts_with("*/") {
                    cursor.bump();
                    cursor.bump();
                    break;
                }
                if cursor.bump().is_none() {
                    return Err(ParseError::new(unit, line, column, "unterminated block comment"));
                }
            }
            continue;
        }

        let kind = match ch {
            '\'' => {
                cursor.bump();
                let mut value = String::new();
                loop {
                    match cursor.bump() {
                        Some('\\') => match cursor.bump() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('r') => value.push('\r'),
                            Some(other) => value.push(other),
                            None => break,
                        },
                        Some('\'') => break,
                        Some('\n') | None => {
                            return Err(ParseError::new(
                                unit,
                                line,
                                column,
                                "unterminated string literal",
                            ))
                        }
                        Some(other) => value.push(other),
                    }
                }
                TokenKind::StringLiteral(value)
            }
            '@' => {
                cursor.bump();
                let name = read_word(&mut cursor);
                if name.is_empty() {
                    return Err(ParseError::new(unit, line, column, "expected annotation name"));
                }
                TokenKind::Annotation(name)
            }
            '[' if is_query_start(cursor.rest) => {
                cursor.bump();
                let mut depth = 1usize;
                let mut query = String::new();
                loop {
                    match cursor.bump() {
                        Some('[') => {
                            depth += 1;
                            query.push('[');
                        }
                        Some(']') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            query.push(']');
                        }
                        Some(other) => query.push(other),
                        None => {
                            return Err(ParseError::new(unit, line, column, "unterminated query"))
                        }
                    }
                }
                TokenKind::Soql(query.trim().to_string())
            }
            '0'..='9' => read_number(&mut cursor, unit, line, column)?,
            c if c.is_alphabetic() || c == '_' => TokenKind::Identifier(read_word(&mut cursor)),
            _ => {
                let Some(p) = PUNCTUATION.iter().find(|p| cursor.starts_with(p)) else {
                    return Err(ParseError::new(
                        unit,
                        line,
                        column,
                        format!("unexpected character '{}'", ch),
                    ));
                };
                for _ in 0..p.len() {
                    cursor.bump();
                }
                TokenKind::Punct(p)
            }
        };

        tokens.push(Token {
            kind,
            line,
            column,
            end_line: cursor.line,
            end_column: cursor.column,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line: cursor.line,
        column: cursor.column,
        end_line: cursor.line,
        end_column: cursor.column,
    });
    Ok(tokens)
}

fn read_word(cursor: &mut Cursor<'_>) -> String {
    let mut word = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            cursor.bump();
        } else {
            break;
        }
    }
    word
}

fn read_number(
    cursor: &mut Cursor<'_>,
    unit: &str,
    line: u32,
    column: u32,
) -> Result<TokenKind, ParseError> {
    let mut digits = String::new();
    while let Some(c) = cursor.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            cursor.bump();
        } else {
            break;
        }
    }

    if cursor.peek() == Some('.') && cursor.peek_second().is_some_and(|c| c.is_ascii_digit()) {
        digits.push('.');
        cursor.bump();
        while let Some(c) = cursor.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                cursor.bump();
            } else {
                break;
            }
        }
        if matches!(cursor.peek(), Some('d') | Some('D')) {
            cursor.bump();
        }
        return Ok(TokenKind::DecimalLiteral(digits));
    }

    let long = matches!(cursor.peek(), Some('l') | Some('L'));
    if long {
        cursor.bump();
    }
    let value = digits
        .parse::<i64>()
        .map_err(|_| ParseError::new(unit, line, column, format!("invalid number '{}'", digits)))?;
    Ok(if long {
        TokenKind::LongLiteral(value)
    } else {
        TokenKind::IntegerLiteral(value)
    })
}

/// `[SELECT ...]` or `[FIND ...]`
fn is_query_start(rest: &str) -> bool {
    let after = rest[1..].trim_start();
    ["select", "find"].iter().any(|kw| {
        after
            .get(..kw.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(kw))
            && after[kw.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace())
    })
}
