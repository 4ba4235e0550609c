use std::{any::Any, fmt::Display, slice};

use num_traits::FromPrimitive;

use crate::{
    chunk::{Chunk, Opcode},
    compiler::Compilation,
    debug,
    table::Table,
    value::{HashedString, ObjString, Object, Value},
};

struct ChunkIter<'a> {
    chunk: &'a Chunk,
    ip: slice::Iter<'a, u8>,
}

impl<'a> ChunkIter<'a> {
    #[inline]
    fn new(chunk: &'a Chunk) -> Self {
        let ip = chunk.code().iter();
        Self { chunk, ip }
    }

    #[inline]
    fn read_byte(&mut self) -> u8 {
        *self.ip.next().unwrap()
    }

    #[inline]
    fn read_constant(&mut self) -> Value {
        self.chunk.constants()[self.read_byte() as usize]
    }

    #[inline]
    fn read_constant_long(&mut self) -> Value {
        let index = (self.read_byte() as usize) << 16
            | (self.read_byte() as usize) << 8
            | self.read_byte() as usize;
        self.chunk.constants()[index]
    }

    #[inline]
    fn as_inner(&self) -> &Chunk {
        self.chunk
    }

    // offset of the next unread byte
    #[inline]
    fn offset(&self) -> usize {
        self.chunk.code().len() - self.ip.len()
    }
}

/// The virtual machine. Owns the value stack, the string intern table, and
/// every heap object created during compilation or execution; objects are
/// freed when the VM is dropped, so a single instance can serve many
/// `interpret` calls with stable string identity.
#[derive(Default)]
pub struct VM {
    stack: Vec<Value>,
    objects: Vec<Object<dyn Any>>,
    strings: Table<()>,
}

impl VM {
    /// Compiles and runs one expression. The final value is printed to
    /// stdout and returned; compile diagnostics and runtime errors go to
    /// stderr.
    pub fn interpret(&mut self, source: &str) -> Result<Value, InterpretError> {
        let mut compilation = Compilation::new(self, source);
        if !compilation.execute() {
            return Err(InterpretError::Compile);
        }

        let chunk = compilation.into_chunk();
        self.run(ChunkIter::new(&chunk))
    }

    #[inline]
    fn push(&mut self, value: impl Into<Value>) {
        self.stack.push(value.into());
    }

    #[inline]
    fn pop(&mut self) -> Value {
        self.stack.pop().unwrap()
    }

    #[inline]
    fn peek(&self, distance: usize) -> &Value {
        &self.stack[self.stack.len() - 1 - distance]
    }

    /// Interns a string: returns the canonical object for this content,
    /// allocating (and taking ownership of `data`) only on first sight.
    pub fn allocate_string(&mut self, data: String) -> ObjString {
        let hashed = HashedString::from(data);
        match self.strings.get_key_value(&hashed) {
            Some((&obj, _)) => obj,
            None => {
                let obj: ObjString = Object::new(hashed);
                self.objects.push(obj.into());
                self.strings.insert(obj, ());
                obj
            }
        }
    }

    fn run(&mut self, mut iter: ChunkIter) -> Result<Value, InterpretError> {
        macro_rules! binary_op {
            ($op:tt) => {{
                let b = *self.peek(0);
                let a = *self.peek(1);
                match (a.as_double(), b.as_double()) {
                    (Some(a), Some(b)) => {
                        self.pop();
                        self.pop();
                        self.push(a $op b);
                    }
                    _ => return Err(self.runtime_error(&iter, "Operands must be numbers.")),
                }
            }};
        }

        loop {
            if cfg!(feature = "trace-execution") {
                eprint!("          ");
                if self.stack.is_empty() {
                    eprint!("<empty stack>");
                }
                for value in &self.stack {
                    eprint!("[ {value} ]");
                }
                eprintln!();
                debug::disassemble_instruction(iter.as_inner(), iter.offset());
            }

            match Opcode::from_u8(iter.read_byte()) {
                Some(Opcode::Constant) => {
                    let constant = iter.read_constant();
                    self.push(constant);
                }
                Some(Opcode::ConstantLong) => {
                    let constant = iter.read_constant_long();
                    self.push(constant);
                }
                Some(Opcode::Nil) => self.push(()),
                Some(Opcode::True) => self.push(true),
                Some(Opcode::False) => self.push(false),
                Some(Opcode::Equal) => {
                    let b = self.pop();
                    let a = self.pop();
                    self.push(a == b);
                }
                Some(Opcode::Greater) => binary_op!(>),
                Some(Opcode::Less) => binary_op!(<),
                Some(Opcode::Add) => {
                    let b = *self.peek(0);
                    let a = *self.peek(1);
                    if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
                        let concatenated = [a, b].join("");
                        let obj = self.allocate_string(concatenated);
                        self.pop();
                        self.pop();
                        self.push(obj);
                    } else if let (Some(a), Some(b)) = (a.as_double(), b.as_double()) {
                        self.pop();
                        self.pop();
                        self.push(a + b);
                    } else {
                        return Err(self.runtime_error(
                            &iter,
                            "Operands must be two numbers or two strings.",
                        ));
                    }
                }
                Some(Opcode::Subtract) => binary_op!(-),
                Some(Opcode::Multiply) => binary_op!(*),
                Some(Opcode::Divide) => binary_op!(/),
                Some(Opcode::Not) => {
                    let result = !self.pop().is_truthy();
                    self.push(result);
                }
                Some(Opcode::Negate) => match self.peek(0).as_double() {
                    Some(number) => {
                        self.pop();
                        self.push(-number);
                    }
                    None => return Err(self.runtime_error(&iter, "Operand must be a number.")),
                },
                Some(Opcode::Return) => {
                    let value = self.pop();
                    println!("{value}");
                    return Ok(value);
                }
                None => return Err(self.runtime_error(&iter, "Unknown opcode.")),
            }
        }
    }

    fn runtime_error(&mut self, iter: &ChunkIter, message: &str) -> InterpretError {
        eprintln!("{message}");
        // the iterator sits just past the failing opcode
        let line = iter.as_inner().lines()[iter.offset() - 1];
        eprintln!("[line {line}] in script");
        self.stack.clear();
        InterpretError::Runtime
    }
}

impl Drop for VM {
    fn drop(&mut self) {
        self.strings.clear();
        for obj in self.objects.drain(..) {
            obj.drop_inner();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretError {
    Compile,
    Runtime,
}

impl Display for InterpretError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpretError::Compile => write!(f, "compile error"),
            InterpretError::Runtime => write!(f, "runtime error"),
        }
    }
}

impl std::error::Error for InterpretError {}
