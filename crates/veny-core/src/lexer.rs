//! Character stream to positioned tokens.
//!
//! A single-pass, greedy scanner with one- and two-character lookahead.
//! The lexer never aborts on bad input: unknown characters and
//! unterminated text literals are reported as `ERROR` tokens rather
//! than by raising, so a single malformed file can't derail scanning
//! of the rest of the token stream (the parser is the one that turns
//! an `ERROR` token into a hard failure).

use crate::source_map::Offset;
use crate::token::{Literal, Token, TokenKind};

/// Scans one file's source text into a token stream.
///
/// The lexer does not track line numbers; offsets are plain byte
/// positions relative to the file, translated to the shared address
/// space via `base`. Line/column lookups happen later, against the
/// `FilePosMap`'s line-start table (see `source_map.rs`).
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    base: Offset,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, base: Offset) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            base,
        }
    }

    /// Scans the entire source, returning a token list always
    /// terminated by exactly one `EOF` token.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.offset_at(self.pos)));
                return tokens;
            }
            tokens.push(self.scan_one());
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.pos];
        self.pos += 1;
        b
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn offset_at(&self, pos: usize) -> Offset {
        Offset::new(self.base.value() + pos as u32)
    }

    /// Skips whitespace and `//` line comments. Neither produces a
    /// token; both are tracked only through the advancing offset.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while !self.is_at_end() && self.peek() != Some(b'\n') {
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn scan_one(&mut self) -> Token {
        let start = self.pos;
        let offset = self.offset_at(start);
        let c = self.advance();

        match c {
            b'(' => self.simple(TokenKind::LParen, start),
            b')' => self.simple(TokenKind::RParen, start),
            b'{' => self.simple(TokenKind::LBrace, start),
            b'}' => self.simple(TokenKind::RBrace, start),
            b'[' => self.simple(TokenKind::LBracket, start),
            b']' => self.simple(TokenKind::RBracket, start),
            b',' => self.simple(TokenKind::Comma, start),
            b';' => self.simple(TokenKind::Semicolon, start),
            b'.' => {
                let kind = if self.match_byte(b'.') {
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                };
                self.simple(kind, start)
            }
            b':' => {
                let kind = if self.match_byte(b':') {
                    TokenKind::ColonColon
                } else if self.match_byte(b'=') {
                    TokenKind::Walrus
                } else {
                    TokenKind::Colon
                };
                self.simple(kind, start)
            }
            b'+' => {
                let kind = if self.match_byte(b'+') {
                    TokenKind::PlusPlus
                } else if self.match_byte(b'=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                };
                self.simple(kind, start)
            }
            b'-' => {
                let kind = if self.match_byte(b'-') {
                    TokenKind::MinusMinus
                } else if self.match_byte(b'=') {
                    TokenKind::MinusEq
                } else if self.match_byte(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                };
                self.simple(kind, start)
            }
            b'*' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                };
                self.simple(kind, start)
            }
            b'/' => {
                // A second '/' is impossible here: skip_trivia() already
                // consumed line comments before scan_one() was called.
                let kind = if self.match_byte(b'=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                };
                self.simple(kind, start)
            }
            b'%' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                };
                self.simple(kind, start)
            }
            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::EqEq
                } else if self.match_byte(b'>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Assign
                };
                self.simple(kind, start)
            }
            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Bang
                };
                self.simple(kind, start)
            }
            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::LtEq
                } else if self.match_byte(b'<') {
                    TokenKind::Shl
                } else {
                    TokenKind::Lt
                };
                self.simple(kind, start)
            }
            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GtEq
                } else if self.match_byte(b'>') {
                    TokenKind::Shr
                } else {
                    TokenKind::Gt
                };
                self.simple(kind, start)
            }
            b'&' if self.match_byte(b'&') => self.simple(TokenKind::AndAnd, start),
            b'|' if self.match_byte(b'|') => self.simple(TokenKind::OrOr, start),
            b'"' => self.scan_text(start),
            b'0'..=b'9' => self.scan_number(start),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_identifier(start),
            other => {
                let lexeme = (other as char).to_string();
                Token::new(TokenKind::Error, lexeme, offset)
            }
        }
    }

    fn simple(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.source[start..self.pos], self.offset_at(start))
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(b'0'..=b'9')) {
            is_float = true;
            self.pos += 1; // consume '.'
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        let lexeme = &self.source[start..self.pos];
        let offset = self.offset_at(start);
        if is_float {
            let value: f64 = lexeme.parse().unwrap_or(0.0);
            Token::new(TokenKind::FloatLiteral, lexeme, offset).with_literal(Literal::Float(value))
        } else {
            let value: i64 = lexeme.parse().unwrap_or(0);
            Token::new(TokenKind::IntLiteral, lexeme, offset).with_literal(Literal::Int(value))
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(b'A'..=b'Z') | Some(b'a'..=b'z') | Some(b'0'..=b'9') | Some(b'_')) {
            self.pos += 1;
        }
        let lexeme = &self.source[start..self.pos];
        let offset = self.offset_at(start);
        match TokenKind::keyword(lexeme) {
            Some(TokenKind::True) => Token::new(TokenKind::True, lexeme, offset).with_literal(Literal::Bool(true)),
            Some(TokenKind::False) => Token::new(TokenKind::False, lexeme, offset).with_literal(Literal::Bool(false)),
            Some(TokenKind::Null) => Token::new(TokenKind::Null, lexeme, offset).with_literal(Literal::Null),
            Some(kind) => Token::new(kind, lexeme, offset),
            None => Token::new(TokenKind::Identifier, lexeme, offset),
        }
    }

    /// Consumes a `"`-delimited text literal. No escape processing is
    /// performed — `"a\"b"` ends at the first interior quote, not the
    /// escaped one.
    fn scan_text(&mut self, start: usize) -> Token {
        let content_start = self.pos;
        while !self.is_at_end() && self.peek() != Some(b'"') {
            self.pos += 1;
        }
        let offset = self.offset_at(start);
        if self.is_at_end() {
            let content = &self.source[content_start..self.pos];
            return Token::new(TokenKind::Error, content, offset)
                .with_literal(Literal::Text("Unterminated string".to_string()));
        }
        let content = self.source[content_start..self.pos].to_string();
        self.pos += 1; // closing quote
        let lexeme = &self.source[start..self.pos];
        Token::new(TokenKind::TextLiteral, lexeme, offset).with_literal(Literal::Text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, Offset::new(1))
            .scan_tokens()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("class Foo ext Bar"),
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Ext,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn boolean_and_null_literals_carry_values() {
        let tokens = Lexer::new("true false null", Offset::new(1)).scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Bool(true)));
        assert_eq!(tokens[1].literal, Some(Literal::Bool(false)));
        assert_eq!(tokens[2].literal, Some(Literal::Null));
    }

    #[test]
    fn integer_and_float_literals() {
        let tokens = Lexer::new("42 3.14", Offset::new(1)).scan_tokens();
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].literal, Some(Literal::Int(42)));
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].literal, Some(Literal::Float(3.14)));
    }

    #[test]
    fn max_int_literal_round_trips() {
        let source = i64::MAX.to_string();
        let tokens = Lexer::new(&source, Offset::new(1)).scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Int(i64::MAX)));
    }

    #[test]
    fn text_literal_no_escapes() {
        let tokens = Lexer::new(r#""hello world""#, Offset::new(1)).scan_tokens();
        assert_eq!(
            tokens[0].literal,
            Some(Literal::Text("hello world".to_string()))
        );
    }

    #[test]
    fn unterminated_text_literal_is_an_error_token() {
        let tokens = Lexer::new("\"oops", Offset::new(1)).scan_tokens();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(
            tokens[0].literal,
            Some(Literal::Text("Unterminated string".to_string()))
        );
    }

    #[test]
    fn line_comments_are_skipped() {
        assert_eq!(
            kinds("var // a comment\nval"),
            vec![TokenKind::Var, TokenKind::Val, TokenKind::Eof]
        );
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            kinds("== != <= >= && || ++ -- -> => :: .. += -= *= /= %= := << >>"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::ColonColon,
                TokenKind::DotDot,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::Walrus,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unknown_character_is_an_error_token_not_a_panic() {
        let tokens = Lexer::new("x ~ y", Offset::new(1)).scan_tokens();
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "~");
    }

    #[test]
    fn offsets_fall_within_base_plus_length() {
        let source = "val x = 1";
        let base = Offset::new(100);
        let tokens = Lexer::new(source, base).scan_tokens();
        for t in &tokens {
            if t.kind == TokenKind::Eof {
                continue;
            }
            assert!(t.offset.value() >= base.value());
            assert!(t.offset.value() < base.value() + source.len() as u32);
        }
    }

    #[test]
    fn scanning_is_deterministic() {
        let source = "class App { entry(args: [Text]): void { Console.print(\"hi\") } }";
        let first = kinds(source);
        let second = kinds(source);
        assert_eq!(first, second);
    }
}
