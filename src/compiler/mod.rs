use crate::{
    chunk::{Chunk, Opcode},
    debug,
    scanner::token::Ty,
    value::Value,
    vm::VM,
};

mod parser;

use self::parser::Parser;

/// One compile call: a Pratt parse of a single expression, emitting
/// straight into a fresh chunk. The VM is borrowed so string literals are
/// interned against the same table execution will use.
pub struct Compilation<'a> {
    parser: Parser<'a>,
    compiling_chunk: Chunk,
    vm: &'a mut VM,
}

impl<'a> Compilation<'a> {
    pub fn new(vm: &'a mut VM, source: &'a str) -> Self {
        let parser = Parser::new(source);
        let compiling_chunk = Chunk::default();
        Self {
            parser,
            compiling_chunk,
            vm,
        }
    }

    /// Compiles the source. On `false` at least one diagnostic went to
    /// stderr and the chunk contents are undefined.
    pub fn execute(&mut self) -> bool {
        self.parser.advance();
        self.expression();
        self.parser.consume(Ty::Eof, "Expected end of expression.");
        self.end();

        !self.parser.had_error()
    }

    fn end(&mut self) {
        self.emit_bytes([Opcode::Return as u8]);
        if cfg!(feature = "print-code") && !self.parser.had_error() {
            debug::disassemble_chunk(&self.compiling_chunk, "code");
        }
    }

    fn binary(&mut self, _: bool) {
        let operator = self.parser.previous().ty();
        let rule = get_rule(operator);
        self.parse_precedence(rule.precedence.successor());

        match operator {
            Ty::BangEqual => self.emit_bytes([Opcode::Equal as u8, Opcode::Not as u8]),
            Ty::EqualEqual => self.emit_bytes([Opcode::Equal as u8]),
            Ty::Greater => self.emit_bytes([Opcode::Greater as u8]),
            Ty::GreaterEqual => self.emit_bytes([Opcode::Less as u8, Opcode::Not as u8]),
            Ty::Less => self.emit_bytes([Opcode::Less as u8]),
            Ty::LessEqual => self.emit_bytes([Opcode::Greater as u8, Opcode::Not as u8]),
            Ty::Plus => self.emit_bytes([Opcode::Add as u8]),
            Ty::Minus => self.emit_bytes([Opcode::Subtract as u8]),
            Ty::Star => self.emit_bytes([Opcode::Multiply as u8]),
            Ty::Slash => self.emit_bytes([Opcode::Divide as u8]),
            _ => unreachable!(),
        }
    }

    fn grouping(&mut self, _: bool) {
        self.expression();
        self.parser
            .consume(Ty::RightParen, "Expected ')' after expression.");
    }

    fn unary(&mut self, _: bool) {
        let operator = self.parser.previous().ty();

        // compile the operand first; the operator applies to its result
        self.parse_precedence(Precedence::Unary);

        match operator {
            Ty::Minus => self.emit_bytes([Opcode::Negate as u8]),
            Ty::Bang => self.emit_bytes([Opcode::Not as u8]),
            _ => unreachable!(),
        }
    }

    fn literal(&mut self, _: bool) {
        match self.parser.previous().ty() {
            Ty::Nil => self.emit_bytes([Opcode::Nil as u8]),
            Ty::True => self.emit_bytes([Opcode::True as u8]),
            Ty::False => self.emit_bytes([Opcode::False as u8]),
            _ => unreachable!(),
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, prec: Precedence) {
        self.parser.advance();
        let prefix_rule = match get_rule(self.parser.previous().ty()).prefix {
            Some(prefix_rule) => prefix_rule,
            None => {
                self.parser.error("Expected expression.");
                return;
            }
        };

        let can_assign = prec <= Precedence::Assignment;
        prefix_rule(self, can_assign);

        while prec <= get_rule(self.parser.current().ty()).precedence {
            self.parser.advance();
            // every token with a non-None precedence has an infix rule
            let infix_rule = get_rule(self.parser.previous().ty()).infix.unwrap();
            infix_rule(self, can_assign);
        }
    }

    fn number(&mut self, _: bool) {
        let value = self.parser.previous().lexeme().parse::<f64>().unwrap();
        self.emit_constant(value);
    }

    fn string(&mut self, _: bool) {
        let lexeme = self.parser.previous().lexeme();
        let copied_str = lexeme[1..lexeme.len() - 1].to_owned();
        let obj = self.vm.allocate_string(copied_str);
        self.emit_constant(obj);
    }

    fn emit_constant(&mut self, value: impl Into<Value>) {
        let line = self.parser.previous().line();
        let constant = self.compiling_chunk.write_constant(value, line);
        if constant > Chunk::MAX_CONSTANT_INDEX {
            self.parser.error("Too many constants in one chunk.");
        }
    }

    fn emit_bytes<const N: usize>(&mut self, bytes: [u8; N]) {
        let line = self.parser.previous().line();
        for byte in bytes {
            self.compiling_chunk.write(byte, line);
        }
    }

    #[inline]
    pub fn into_chunk(self) -> Chunk {
        self.compiling_chunk
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Precedence {
    None,
    Assignment, // =
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // . ()
    Primary,
}

impl Precedence {
    fn successor(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn<'a> = fn(&mut Compilation<'a>, can_assign: bool);

struct ParseRule<'a> {
    prefix: Option<ParseFn<'a>>,
    infix: Option<ParseFn<'a>>,
    precedence: Precedence,
}

fn get_rule<'a>(operator: Ty) -> ParseRule<'a> {
    #[rustfmt::skip]
    let (prefix, infix, precedence): (Option<ParseFn>, Option<ParseFn>, Precedence) = match operator
    {
        Ty::LeftParen    => (Some(Compilation::grouping), None,                      Precedence::None),
        Ty::RightParen   => (None,                        None,                      Precedence::None),
        Ty::LeftBrace    => (None,                        None,                      Precedence::None),
        Ty::RightBrace   => (None,                        None,                      Precedence::None),
        Ty::Comma        => (None,                        None,                      Precedence::None),
        Ty::Dot          => (None,                        None,                      Precedence::None),
        Ty::Minus        => (Some(Compilation::unary),    Some(Compilation::binary), Precedence::Term),
        Ty::Plus         => (None,                        Some(Compilation::binary), Precedence::Term),
        Ty::Semicolon    => (None,                        None,                      Precedence::None),
        Ty::Slash        => (None,                        Some(Compilation::binary), Precedence::Factor),
        Ty::Star         => (None,                        Some(Compilation::binary), Precedence::Factor),
        Ty::Bang         => (Some(Compilation::unary),    None,                      Precedence::None),
        Ty::BangEqual    => (None,                        Some(Compilation::binary), Precedence::Equality),
        Ty::Equal        => (None,                        None,                      Precedence::None),
        Ty::EqualEqual   => (None,                        Some(Compilation::binary), Precedence::Equality),
        Ty::Greater      => (None,                        Some(Compilation::binary), Precedence::Comparison),
        Ty::GreaterEqual => (None,                        Some(Compilation::binary), Precedence::Comparison),
        Ty::Less         => (None,                        Some(Compilation::binary), Precedence::Comparison),
        Ty::LessEqual    => (None,                        Some(Compilation::binary), Precedence::Comparison),
        Ty::Identifier   => (None,                        None,                      Precedence::None),
        Ty::String       => (Some(Compilation::string),   None,                      Precedence::None),
        Ty::Number       => (Some(Compilation::number),   None,                      Precedence::None),
        Ty::And          => (None,                        None,                      Precedence::None),
        Ty::Class        => (None,                        None,                      Precedence::None),
        Ty::Else         => (None,                        None,                      Precedence::None),
        Ty::False        => (Some(Compilation::literal),  None,                      Precedence::None),
        Ty::For          => (None,                        None,                      Precedence::None),
        Ty::Fun          => (None,                        None,                      Precedence::None),
        Ty::If           => (None,                        None,                      Precedence::None),
        Ty::Nil          => (Some(Compilation::literal),  None,                      Precedence::None),
        Ty::Or           => (None,                        None,                      Precedence::None),
        Ty::Print        => (None,                        None,                      Precedence::None),
        Ty::Return       => (None,                        None,                      Precedence::None),
        Ty::Super        => (None,                        None,                      Precedence::None),
        Ty::This         => (None,                        None,                      Precedence::None),
        Ty::True         => (Some(Compilation::literal),  None,                      Precedence::None),
        Ty::Var          => (None,                        None,                      Precedence::None),
        Ty::While        => (None,                        None,                      Precedence::None),
        Ty::Error        => (None,                        None,                      Precedence::None),
        Ty::Eof          => (None,                        None,                      Precedence::None),
    };
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}
