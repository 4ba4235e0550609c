use std::str::CharIndices;

use itertools::{Itertools, MultiPeek};

use self::token::{Token, Ty};

pub mod token;

/// A character cursor over the source buffer. Tokens borrow their lexemes
/// from the source; scanning never allocates.
pub struct Scanner<'a> {
    source: &'a str,
    start: usize,
    current: MultiPeek<CharIndices<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        let start = 0;
        let current = source.char_indices().multipeek();
        let line = 1;
        Self {
            source,
            start,
            current,
            line,
        }
    }

    // byte offset of the next unconsumed character; the peek cursor must be
    // in its reset state
    #[inline]
    fn offset(&mut self) -> usize {
        let offset = self
            .current
            .peek()
            .map(|&(offset, _)| offset)
            .unwrap_or(self.source.len());
        self.current.reset_peek();
        offset
    }

    fn make_token(&mut self, ty: Ty) -> Token<'a> {
        let offset = self.offset();
        let lexeme = &self.source[self.start..offset];
        self.start = offset;
        Token::new(ty, lexeme, self.line)
    }

    fn error_token(&self, message: &'static str) -> Token<'static> {
        Token::new(Ty::Error, message, self.line)
    }

    #[inline]
    fn peek(&mut self) -> Option<char> {
        self.current.peek().map(|&(_, c)| c)
    }

    fn reset_peek(&mut self) {
        self.current.reset_peek();
    }

    #[inline]
    fn advance(&mut self) -> Option<char> {
        self.current.next().map(|(_, c)| c)
    }

    fn matches(&mut self, expected: char) -> bool {
        if let Some(current) = self.peek() {
            if current == expected {
                self.advance();
                return true;
            }
        }
        self.reset_peek();
        false
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\r') | Some('\t') => {
                    self.advance();
                }
                Some('\n') => {
                    self.line += 1;
                    self.advance();
                }
                Some('/') => {
                    if self.peek() != Some('/') {
                        break;
                    }
                    // a comment goes until the end of the line
                    loop {
                        match self.advance() {
                            Some('\n') => {
                                self.line += 1;
                                break;
                            }
                            None => break,
                            Some(_) => {}
                        }
                    }
                }
                _ => break,
            }
        }
        self.reset_peek();
    }

    fn string(&mut self) -> Token<'a> {
        while !matches!(self.peek(), Some('"') | None) {
            if let Some('\n') = self.advance() {
                self.line += 1;
            }
        }

        match self.advance() {
            // the closing quote
            Some(_) => self.make_token(Ty::String),
            None => self.error_token("Unterminated string."),
        }
    }

    fn peek_is_digit(&mut self) -> bool {
        matches!(self.peek(), Some(c) if c.is_ascii_digit())
    }

    fn number(&mut self) -> Token<'a> {
        while self.peek_is_digit() {
            self.advance();
        }
        self.reset_peek();

        // a fractional part needs at least one digit after the dot
        if matches!(self.peek(), Some('.')) && self.peek_is_digit() {
            self.advance();
            while self.peek_is_digit() {
                self.advance();
            }
        }
        self.reset_peek();
        self.make_token(Ty::Number)
    }

    fn identifier_type(&mut self) -> Ty {
        match self.source.as_bytes()[self.start] {
            b'a' => return self.check_keyword(1, b"nd", Ty::And),
            b'c' => return self.check_keyword(1, b"lass", Ty::Class),
            b'e' => return self.check_keyword(1, b"lse", Ty::Else),
            b'f' => {
                if self.offset() - self.start > 1 {
                    match self.source.as_bytes()[self.start + 1] {
                        b'a' => return self.check_keyword(2, b"lse", Ty::False),
                        b'o' => return self.check_keyword(2, b"r", Ty::For),
                        b'u' => return self.check_keyword(2, b"n", Ty::Fun),
                        _ => {}
                    }
                }
            }
            b'i' => return self.check_keyword(1, b"f", Ty::If),
            b'n' => return self.check_keyword(1, b"il", Ty::Nil),
            b'o' => return self.check_keyword(1, b"r", Ty::Or),
            b'p' => return self.check_keyword(1, b"rint", Ty::Print),
            b'r' => return self.check_keyword(1, b"eturn", Ty::Return),
            b's' => return self.check_keyword(1, b"uper", Ty::Super),
            b't' => {
                if self.offset() - self.start > 1 {
                    match self.source.as_bytes()[self.start + 1] {
                        b'h' => return self.check_keyword(2, b"is", Ty::This),
                        b'r' => return self.check_keyword(2, b"ue", Ty::True),
                        _ => {}
                    }
                }
            }
            b'v' => return self.check_keyword(1, b"ar", Ty::Var),
            b'w' => return self.check_keyword(1, b"hile", Ty::While),
            _ => {}
        }
        Ty::Identifier
    }

    fn check_keyword(&mut self, start: usize, rest: &[u8], ty: Ty) -> Ty {
        if &self.source.as_bytes()[self.start + start..self.offset()] == rest {
            ty
        } else {
            Ty::Identifier
        }
    }

    fn identifier(&mut self) -> Token<'a> {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        self.reset_peek();
        let ty = self.identifier_type();
        self.make_token(ty)
    }

    pub fn scan_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        self.start = self.offset();
        match self.advance() {
            None => self.make_token(Ty::Eof),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('(') => self.make_token(Ty::LeftParen),
            Some(')') => self.make_token(Ty::RightParen),
            Some('{') => self.make_token(Ty::LeftBrace),
            Some('}') => self.make_token(Ty::RightBrace),
            Some(';') => self.make_token(Ty::Semicolon),
            Some(',') => self.make_token(Ty::Comma),
            Some('.') => self.make_token(Ty::Dot),
            Some('-') => self.make_token(Ty::Minus),
            Some('+') => self.make_token(Ty::Plus),
            Some('/') => self.make_token(Ty::Slash),
            Some('*') => self.make_token(Ty::Star),
            Some('!') => {
                let token = if self.matches('=') {
                    Ty::BangEqual
                } else {
                    Ty::Bang
                };
                self.make_token(token)
            }
            Some('=') => {
                let token = if self.matches('=') {
                    Ty::EqualEqual
                } else {
                    Ty::Equal
                };
                self.make_token(token)
            }
            Some('<') => {
                let token = if self.matches('=') {
                    Ty::LessEqual
                } else {
                    Ty::Less
                };
                self.make_token(token)
            }
            Some('>') => {
                let token = if self.matches('=') {
                    Ty::GreaterEqual
                } else {
                    Ty::Greater
                };
                self.make_token(token)
            }
            Some('"') => self.string(),
            _ => self.error_token("Unexpected character."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<(Ty, &str)> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.scan_token();
            let ty = token.ty();
            tokens.push((ty, token.lexeme()));
            if ty == Ty::Eof {
                break;
            }
        }
        tokens
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            scan_all("(){};,.-+/*"),
            vec![
                (Ty::LeftParen, "("),
                (Ty::RightParen, ")"),
                (Ty::LeftBrace, "{"),
                (Ty::RightBrace, "}"),
                (Ty::Semicolon, ";"),
                (Ty::Comma, ","),
                (Ty::Dot, "."),
                (Ty::Minus, "-"),
                (Ty::Plus, "+"),
                (Ty::Slash, "/"),
                (Ty::Star, "*"),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn one_or_two_char_operators() {
        assert_eq!(
            scan_all("! != = == < <= > >="),
            vec![
                (Ty::Bang, "!"),
                (Ty::BangEqual, "!="),
                (Ty::Equal, "="),
                (Ty::EqualEqual, "=="),
                (Ty::Less, "<"),
                (Ty::LessEqual, "<="),
                (Ty::Greater, ">"),
                (Ty::GreaterEqual, ">="),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            scan_all("1 12.5 0.25"),
            vec![
                (Ty::Number, "1"),
                (Ty::Number, "12.5"),
                (Ty::Number, "0.25"),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn trailing_dot_is_not_a_fraction() {
        assert_eq!(
            scan_all("1."),
            vec![(Ty::Number, "1"), (Ty::Dot, "."), (Ty::Eof, "")]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            scan_all("and android false fn fun _under f true trueish"),
            vec![
                (Ty::And, "and"),
                (Ty::Identifier, "android"),
                (Ty::False, "false"),
                (Ty::Identifier, "fn"),
                (Ty::Fun, "fun"),
                (Ty::Identifier, "_under"),
                (Ty::Identifier, "f"),
                (Ty::True, "true"),
                (Ty::Identifier, "trueish"),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn strings_keep_quotes_in_lexeme() {
        assert_eq!(
            scan_all("\"hello\" + \"\""),
            vec![
                (Ty::String, "\"hello\""),
                (Ty::Plus, "+"),
                (Ty::String, "\"\""),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            scan_all("\"oops"),
            vec![(Ty::Error, "Unterminated string."), (Ty::Eof, "")]
        );
    }

    #[test]
    fn string_spanning_lines_counts_them() {
        let mut scanner = Scanner::new("\"a\nb\"\n1");
        let string = scanner.scan_token();
        assert_eq!(string.ty(), Ty::String);
        assert_eq!(string.line(), 2);
        let number = scanner.scan_token();
        assert_eq!(number.ty(), Ty::Number);
        assert_eq!(number.line(), 3);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            scan_all("1 // the rest is ignored\n+ 2 // to the very end"),
            vec![
                (Ty::Number, "1"),
                (Ty::Plus, "+"),
                (Ty::Number, "2"),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn slash_alone_is_division() {
        assert_eq!(
            scan_all("1 / 2"),
            vec![
                (Ty::Number, "1"),
                (Ty::Slash, "/"),
                (Ty::Number, "2"),
                (Ty::Eof, ""),
            ]
        );
    }

    #[test]
    fn comment_advances_line_counter() {
        let mut scanner = Scanner::new("// comment\n7");
        let token = scanner.scan_token();
        assert_eq!(token.ty(), Ty::Number);
        assert_eq!(token.line(), 2);
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(
            scan_all("@"),
            vec![(Ty::Error, "Unexpected character."), (Ty::Eof, "")]
        );
    }

    #[test]
    fn eof_is_idempotent() {
        let mut scanner = Scanner::new("nil");
        assert_eq!(scanner.scan_token().ty(), Ty::Nil);
        for _ in 0..3 {
            assert_eq!(scanner.scan_token().ty(), Ty::Eof);
        }
    }
}
