//! Infix expression parser.
//!
//! Standard precedence, left-associative:
//!
//! ```text
//! expression := term (('+'|'-') term)*
//! term       := factor (('*'|'/') factor)*
//! factor     := '(' expression ')' | ['+'|'-'] number
//! number     := digit+ ('.' digit+)?
//! ```
//!
//! Whitespace is stripped before parsing. The parser only constructs
//! nodes; it never schedules anything.

use crate::error::ParseError;
use crate::expr::arena::{BinaryOp, NodeId, Term, TermArena};

/// Parse an infix expression into a fresh term arena.
pub fn parse(input: &str) -> Result<TermArena, ParseError> {
    let src: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if src.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        src,
        pos: 0,
        arena: TermArena::new(),
    };
    let root = parser.expression()?;
    if parser.pos < parser.src.len() {
        return Err(ParseError::TrailingInput { pos: parser.pos });
    }

    parser.arena.set_root(root);
    Ok(parser.arena)
}

struct Parser {
    src: Vec<u8>,
    pos: usize,
    arena: TermArena,
}

impl Parser {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        self.pos += 1;
        b
    }

    fn expression(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.term()?;
        while let Some(b @ (b'+' | b'-')) = self.peek() {
            self.bump();
            let op = if b == b'+' { BinaryOp::Add } else { BinaryOp::Sub };
            let right = self.term()?;
            node = self.operation(op, node, right);
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<NodeId, ParseError> {
        let mut node = self.factor()?;
        while let Some(b @ (b'*' | b'/')) = self.peek() {
            self.bump();
            let op = if b == b'*' { BinaryOp::Mul } else { BinaryOp::Div };
            let right = self.factor()?;
            node = self.operation(op, node, right);
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<NodeId, ParseError> {
        if self.peek() == Some(b'(') {
            self.bump();
            let node = self.expression()?;
            let close = self.pos;
            if self.bump() != Some(b')') {
                return Err(ParseError::UnclosedParen { pos: close });
            }
            return Ok(node);
        }

        let start = self.pos;
        if let Some(b'+' | b'-') = self.peek() {
            self.bump();
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || b == b'.' {
                self.bump();
            } else {
                break;
            }
        }

        let text = &self.src[start..self.pos];
        if text.is_empty() {
            return Err(ParseError::InvalidNumber { pos: start });
        }
        // The slice holds only ASCII digits, dots and signs by construction.
        let text = std::str::from_utf8(text)
            .map_err(|_| ParseError::InvalidNumber { pos: start })?;
        let value: f64 = text.parse().map_err(|_| ParseError::MalformedNumber {
            text: text.to_string(),
        })?;

        Ok(self.arena.alloc(Term::Literal(value)))
    }

    fn operation(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.arena.alloc(Term::Operation {
            op,
            left,
            right,
            task_emitted: false,
        })
    }
}
