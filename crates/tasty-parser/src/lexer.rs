//! Lexer for style values.
//!
//! Splits a raw value such as `calc(100% - 2x) #dark.50 top` into tokens.
//! Whitespace is never emitted; it only decides whether a `-` starts a
//! negative number (or a word) or acts as the subtraction operator.

/// Token types produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Quoted string including its quotes. May lack the closing quote.
    Quoted(&'a str),
    /// A complete `url(...)` call, kept raw.
    Url(&'a str),
    /// Function opener `name(`; holds the name only.
    Function(&'a str),
    /// Hash color `#name` or `#name.opacity`, including the `#`.
    Color(&'a str),
    /// Custom property reference `@name` or `--name`; holds the bare name.
    Property(&'a str),
    /// Bare identifier.
    Word(&'a str),
    /// Numeric literal with an optional unit suffix.
    Number { value: &'a str, unit: &'a str },
    /// One of `+ - * /`.
    Operator(char),
    Open,
    Close,
    Comma,
    /// Any other character, passed through as text.
    Other(&'a str),
}

/// Iterator over `(byte offset, token)` pairs of a style value.
pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether the previous token leaves room for a sign (`-2x`).
    sign_allowed: bool,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            sign_allowed: true,
        }
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    pub(crate) fn is_ident_char(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
    }

    /// Advances while `pred` holds and returns the consumed slice.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek_byte(0) {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn starts_number(&self, offset: usize) -> bool {
        match self.peek_byte(offset) {
            Some(b) if b.is_ascii_digit() => true,
            Some(b'.') => self.peek_byte(offset + 1).is_some_and(|b| b.is_ascii_digit()),
            _ => false,
        }
    }

    fn lex_number(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'-') {
            self.pos += 1;
        }
        self.take_while(|b| b.is_ascii_digit());
        if self.peek_byte(0) == Some(b'.')
            && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            self.take_while(|b| b.is_ascii_digit());
        }
        let value = &self.input[start..self.pos];
        let unit = self.take_while(|b| b.is_ascii_alphabetic() || b == b'%');
        Token::Number { value, unit }
    }

    fn lex_quoted(&mut self, quote: u8) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek_byte(0) {
            self.pos += 1;
            if b == quote {
                return Token::Quoted(&self.input[start..self.pos]);
            }
        }
        Token::Quoted(&self.input[start..])
    }

    fn lex_ident(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'-') {
            self.pos += 1;
        }
        self.take_while(Self::is_ident_char);
        let name = &self.input[start..self.pos];

        if self.peek_byte(0) != Some(b'(') {
            return Token::Word(name);
        }

        if name.eq_ignore_ascii_case("url") {
            let end = self.input[self.pos..]
                .find(')')
                .map(|i| self.pos + i + 1)
                .unwrap_or(self.input.len());
            self.pos = end;
            return Token::Url(&self.input[start..end]);
        }

        self.pos += 1;
        Token::Function(name)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let mut had_space = false;
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
            had_space = true;
        }

        let start = self.pos;
        let b = self.peek_byte(0)?;
        let sign_context = self.sign_allowed || had_space;

        let token = match b {
            b'\'' | b'"' => self.lex_quoted(b),
            b'(' => {
                self.pos += 1;
                Token::Open
            }
            b')' => {
                self.pos += 1;
                Token::Close
            }
            b',' => {
                self.pos += 1;
                Token::Comma
            }
            b'#' => {
                self.pos += 1;
                let name = self.take_while(|b| Self::is_ident_char(b) || b == b'.');
                if name.is_empty() {
                    Token::Other("#")
                } else {
                    Token::Color(&self.input[start..self.pos])
                }
            }
            b'@' if self.peek_byte(1).is_some_and(Self::is_ident_char) => {
                self.pos += 1;
                Token::Property(self.take_while(Self::is_ident_char))
            }
            b'-' if self.peek_byte(1) == Some(b'-')
                && self.peek_byte(2).is_some_and(Self::is_ident_char) =>
            {
                self.pos += 2;
                Token::Property(self.take_while(Self::is_ident_char))
            }
            b'-' if sign_context && self.starts_number(1) => self.lex_number(),
            b'-' if sign_context && self.peek_byte(1).is_some_and(Self::is_ident_start) => {
                self.lex_ident()
            }
            b'+' | b'-' | b'*' | b'/' => {
                self.pos += 1;
                Token::Operator(b as char)
            }
            _ if self.starts_number(0) => self.lex_number(),
            _ if Self::is_ident_start(b) => self.lex_ident(),
            _ => {
                let len = self.input[self.pos..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                self.pos += len;
                Token::Other(&self.input[start..self.pos])
            }
        };

        self.sign_allowed = matches!(
            token,
            Token::Open | Token::Comma | Token::Operator(_) | Token::Function(_)
        );

        Some((start, token))
    }
}
