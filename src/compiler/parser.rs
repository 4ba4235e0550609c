use crate::scanner::token::{Token, Ty};
use crate::scanner::Scanner;

/// The parser's token window and error state. `advance` reports error
/// tokens itself, so the rest of the compiler only ever sees well-formed
/// tokens; `panic_mode` suppresses cascading diagnostics after the first.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token<'a>,
    previous: Token<'a>,
    had_error: bool,
    panic_mode: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        // both tokens are replaced by the first advance
        let placeholder = Token::new(Ty::Eof, "", 1);
        Self {
            scanner: Scanner::new(source),
            current: placeholder,
            previous: placeholder,
            had_error: false,
            panic_mode: false,
        }
    }

    #[inline]
    pub fn previous(&self) -> Token<'a> {
        self.previous
    }

    #[inline]
    pub fn current(&self) -> Token<'a> {
        self.current
    }

    pub fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.ty() != Ty::Error {
                break;
            }
            let message = self.current.lexeme();
            self.error_at_current(message);
        }
    }

    pub fn consume(&mut self, ty: Ty, message: &str) {
        if self.current.ty() != ty {
            self.error_at_current(message);
            return;
        }
        self.advance();
    }

    #[inline]
    pub fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current(), message);
    }

    #[inline]
    pub fn error(&mut self, message: &str) {
        self.error_at(self.previous(), message);
    }

    fn error_at(&mut self, token: Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        eprint!("[line {}] Error", token.line());

        if token.ty() == Ty::Eof {
            eprint!(" at end");
        } else if token.ty() == Ty::Error {
            // the message already describes the lexeme
        } else {
            eprint!(" at '{}'", token.lexeme());
        }

        eprintln!(": {message}");

        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }
}
