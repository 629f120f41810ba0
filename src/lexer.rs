//! Tokenizer for the textual operation format.
//!
//! The whole input is tokenized up front so the parser can checkpoint and
//! restore a plain index. Every token carries its byte span; token text is
//! recovered by slicing the `SourceText`.

use crate::error::ParseError;
use crate::location::{SourceText, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Integer,
    Float,
    Str,
    Percent,
    At,
    Bang,
    Equal,
    Comma,
    Colon,
    Arrow,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Less,
    Greater,
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'s>(&self, source: &'s SourceText) -> &'s str {
        source.slice(self.span)
    }
}

/// Tokenize the full input. `//` line comments and whitespace are skipped;
/// the final token is always `Eof` with an empty span at end of input.
pub fn tokenize(source: &SourceText) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_str().as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            b'%' => tokens.push(punct(TokenKind::Percent, &mut pos)),
            b'@' => tokens.push(punct(TokenKind::At, &mut pos)),
            b'!' => tokens.push(punct(TokenKind::Bang, &mut pos)),
            b'=' => tokens.push(punct(TokenKind::Equal, &mut pos)),
            b',' => tokens.push(punct(TokenKind::Comma, &mut pos)),
            b':' => tokens.push(punct(TokenKind::Colon, &mut pos)),
            b'(' => tokens.push(punct(TokenKind::LParen, &mut pos)),
            b')' => tokens.push(punct(TokenKind::RParen, &mut pos)),
            b'{' => tokens.push(punct(TokenKind::LBrace, &mut pos)),
            b'}' => tokens.push(punct(TokenKind::RBrace, &mut pos)),
            b'[' => tokens.push(punct(TokenKind::LBracket, &mut pos)),
            b']' => tokens.push(punct(TokenKind::RBracket, &mut pos)),
            b'<' => tokens.push(punct(TokenKind::Less, &mut pos)),
            b'>' => tokens.push(punct(TokenKind::Greater, &mut pos)),
            b'-' => {
                if bytes.get(pos + 1) == Some(&b'>') {
                    tokens.push(Token {
                        kind: TokenKind::Arrow,
                        span: Span::new(pos, pos + 2),
                    });
                    pos += 2;
                } else if bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
                    tokens.push(lex_number(bytes, &mut pos));
                } else {
                    return Err(ParseError::new(
                        Span::new(pos, pos + 1),
                        "unexpected character `-`",
                    ));
                }
            }
            b'"' => tokens.push(lex_string(bytes, &mut pos)?),
            b'0'..=b'9' => tokens.push(lex_number(bytes, &mut pos)),
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = pos;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric()
                        || bytes[pos] == b'_'
                        || bytes[pos] == b'.')
                {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    span: Span::new(start, pos),
                });
            }
            _ => {
                return Err(ParseError::new(
                    Span::new(pos, pos + 1),
                    format!("unexpected character `{}`", bytes[pos] as char),
                ));
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(bytes.len(), bytes.len()),
    });
    Ok(tokens)
}

fn punct(kind: TokenKind, pos: &mut usize) -> Token {
    let span = Span::new(*pos, *pos + 1);
    *pos += 1;
    Token { kind, span }
}

/// Lex an integer or float. Floats require a decimal point; an exponent is
/// only accepted after one.
fn lex_number(bytes: &[u8], pos: &mut usize) -> Token {
    let start = *pos;
    if bytes[*pos] == b'-' {
        *pos += 1;
    }
    while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
        *pos += 1;
    }

    let mut kind = TokenKind::Integer;
    if *pos < bytes.len()
        && bytes[*pos] == b'.'
        && bytes.get(*pos + 1).is_some_and(u8::is_ascii_digit)
    {
        kind = TokenKind::Float;
        *pos += 1;
        while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
            *pos += 1;
        }
        if *pos < bytes.len() && (bytes[*pos] == b'e' || bytes[*pos] == b'E') {
            let mut after = *pos + 1;
            if bytes.get(after) == Some(&b'+') || bytes.get(after) == Some(&b'-') {
                after += 1;
            }
            if bytes.get(after).is_some_and(u8::is_ascii_digit) {
                *pos = after;
                while *pos < bytes.len() && bytes[*pos].is_ascii_digit() {
                    *pos += 1;
                }
            }
        }
    }

    Token {
        kind,
        span: Span::new(start, *pos),
    }
}

/// Lex a string literal. The span covers the quotes; `decode_string_literal`
/// resolves escapes.
fn lex_string(bytes: &[u8], pos: &mut usize) -> Result<Token, ParseError> {
    let start = *pos;
    *pos += 1;
    while *pos < bytes.len() {
        match bytes[*pos] {
            b'"' => {
                *pos += 1;
                return Ok(Token {
                    kind: TokenKind::Str,
                    span: Span::new(start, *pos),
                });
            }
            b'\\' => {
                *pos += 2;
            }
            _ => {
                *pos += 1;
            }
        }
    }
    Err(ParseError::new(
        Span::new(start, bytes.len()),
        "unterminated string literal",
    ))
}

/// Decode the escapes in a raw string literal (quotes included).
///
/// Unknown escapes and invalid `\xNN` digits pass through unchanged.
pub fn decode_string_literal(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let rest = chars.as_str().as_bytes();
                if rest.len() >= 2
                    && rest[0].is_ascii_hexdigit()
                    && rest[1].is_ascii_hexdigit()
                {
                    let byte = (hex_digit(rest[0]) << 4) | hex_digit(rest[1]);
                    out.push(byte as char);
                    chars.next();
                    chars.next();
                } else {
                    out.push('\\');
                    out.push('x');
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}
