use crate::error::Span;
use crate::token::{lookup_ident, Token, TokenKind};

/// Single-pass scanner over the source text. Call `next_token` until it
/// returns `Eof`, or iterate: the iterator yields the `Eof` token once and
/// then stops.
pub struct Lexer {
    source: String,
    start: usize,
    current: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            start: 0,
            current: 0,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.current;

        let token = match self.advance() {
            None => Token::new(TokenKind::Eof, String::new(), Span::single(self.current)),
            Some(c) => self.scan_token(c),
        };

        tracing::trace!(kind = ?token.kind, literal = %token.literal, "token");
        token
    }

    fn scan_token(&mut self, c: char) -> Token {
        match c {
            '(' => self.make_token(TokenKind::LParen),
            ')' => self.make_token(TokenKind::RParen),
            '{' => self.make_token(TokenKind::LBrace),
            '}' => self.make_token(TokenKind::RBrace),
            '[' => self.make_token(TokenKind::LBracket),
            ']' => self.make_token(TokenKind::RBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            ':' => self.make_token(TokenKind::Colon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Asterisk),
            '/' => self.make_token(TokenKind::Slash),
            '!' => self.either('=', TokenKind::NotEq, TokenKind::Bang),
            '=' => self.either('=', TokenKind::Eq, TokenKind::Assign),
            '<' => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '&' => self.either('&', TokenKind::And, TokenKind::Illegal),
            '|' => self.either('|', TokenKind::Or, TokenKind::Illegal),
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_letter(c) => self.identifier(),
            _ => self.make_token(TokenKind::Illegal),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\n' | '\r') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    /// Greedy two-character match with a one-character fallback.
    fn either(&mut self, second: char, matched: TokenKind, single: TokenKind) -> Token {
        let kind = if self.match_char(second) {
            matched
        } else {
            single
        };
        self.make_token(kind)
    }

    fn string(&mut self) -> Token {
        let mut content = String::new();

        loop {
            match self.advance() {
                None => {
                    // Unterminated: the literal is the raw text from the opening quote.
                    return self.make_token(TokenKind::Illegal);
                }
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('r') => content.push('\r'),
                    Some('"') => content.push('"'),
                    Some('\\') => content.push('\\'),
                    Some(other) => {
                        content.push('\\');
                        content.push(other);
                    }
                    None => return self.make_token(TokenKind::Illegal),
                },
                Some(c) => content.push(c),
            }
        }

        Token::new(
            TokenKind::String,
            content,
            Span::new(self.start, self.current),
        )
    }

    fn number(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        self.make_token(TokenKind::Int)
    }

    fn identifier(&mut self) -> Token {
        while matches!(self.peek(), Some(c) if is_letter(c) || c.is_ascii_digit()) {
            self.advance();
        }

        let kind = lookup_ident(&self.source[self.start..self.current]);
        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            self.source[self.start..self.current].to_string(),
            Span::new(self.start, self.current),
        )
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
