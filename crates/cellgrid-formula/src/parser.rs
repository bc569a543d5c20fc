//! Formula parser
//!
//! A recursive descent parser for formulas with standard arithmetic
//! precedence. The grammar is closed: numeric literals, cell references,
//! linear ranges (only as whole function arguments), calls of registered
//! functions, unary sign and the four arithmetic operators.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{self, Param};
use cellgrid_core::{CellAddress, CellRange};
use std::fmt;

/// Deepest expression a formula may nest
///
/// Counts parentheses, function calls, unary signs and every operator node,
/// so a long `1+1+...` chain is as deep as it has terms.
pub const MAX_DEPTH: usize = 256;

/// Parse formula text (without the leading `=`) into an AST
///
/// # Example
/// ```rust
/// use cellgrid_formula::parse_formula;
/// use cellgrid_core::ErrorKind;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("SUM(A1:A10)/2").unwrap();
///
/// let err = parse_formula("MEDIAN(A1:A3)").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::UnknownFunction);
///
/// let err = parse_formula("(1+2").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ParseError);
/// assert_eq!(err.position(), 4);
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(formula)?;
    let (expr, _) = parser.parse_expression()?;
    let expr = parser.scalar(expr, 0)?;

    // Make sure we consumed all input
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::parse(
            parser.token_start,
            format!("Unexpected {} after expression", parser.current_token()),
        ));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Reference(String), // Cell reference like A1, upper-cased
    Identifier(String), // Function name, upper-cased

    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Comma,

    LeftParen,
    RightParen,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Reference(r) => write!(f, "reference {}", r),
            Token::Identifier(name) => write!(f, "name {}", name),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of formula"),
        }
    }
}

/// A parsed subexpression and the depth of its tree
type Parsed = (FormulaExpr, usize);

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    /// Byte offset where `current_token` starts
    token_start: usize,
    /// Open parentheses, calls and unary signs around the current token
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            token_start: 0,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() {
            return Ok(self.scan_identifier_or_ref());
        }

        Err(FormulaError::parse(
            self.pos,
            format!("Unexpected character '{}'", c),
        ))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E')
            && self.peek_char_at(1).map_or(false, |c| {
                c.is_ascii_digit() || c == '+' || c == '-'
            })
        {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::parse(start, format!("Malformed number '{}'", num_str)))
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = self.input[start..self.pos].to_ascii_uppercase();

        // Letters followed by digits is a reference, unless it is being called
        if Self::is_cell_reference(&text) && self.peek_char() != Some('(') {
            return Token::Reference(text);
        }

        Token::Identifier(text)
    }

    fn is_cell_reference(text: &str) -> bool {
        let digits = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        digits.len() < text.len()
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::parse(
                self.token_start,
                format!("Expected {}, got {}", expected, self.current_token()),
            ))
        }
    }

    /// Reject a range used as an operand
    fn scalar(&self, expr: FormulaExpr, position: usize) -> FormulaResult<FormulaExpr> {
        match expr {
            FormulaExpr::RangeRef(range) => Err(FormulaError::parse(
                position,
                format!(
                    "Range {} is only allowed as a function argument",
                    range
                ),
            )),
            expr => Ok(expr),
        }
    }

    fn enter(&mut self, position: usize) -> FormulaResult<()> {
        if self.nesting >= MAX_DEPTH {
            return Err(too_deep(position));
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: -, +
    // 4. Range: :
    // 5. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Parsed> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Parsed> {
        let start = self.token_start;
        let (mut left, mut depth) = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            let op_start = self.token_start;
            left = self.scalar(left, start)?;
            self.consume()?;
            let right_start = self.token_start;
            let (right, right_depth) = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(self.scalar(right, right_start)?),
            };
            depth = node_depth(op_start, depth.max(right_depth))?;
        }

        Ok((left, depth))
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Parsed> {
        let start = self.token_start;
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            let op_start = self.token_start;
            left = self.scalar(left, start)?;
            self.consume()?;
            let right_start = self.token_start;
            let (right, right_depth) = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(self.scalar(right, right_start)?),
            };
            depth = node_depth(op_start, depth.max(right_depth))?;
        }

        Ok((left, depth))
    }

    fn parse_unary(&mut self) -> FormulaResult<Parsed> {
        let start = self.token_start;

        // Prefix unary minus
        if matches!(self.current_token(), Token::Minus) {
            self.enter(start)?;
            self.consume()?;
            let operand_start = self.token_start;
            let (operand, depth) = self.parse_unary()?;
            self.leave();
            let expr = FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(self.scalar(operand, operand_start)?),
            };
            return Ok((expr, node_depth(start, depth)?));
        }

        // Prefix plus (no-op)
        if matches!(self.current_token(), Token::Plus) {
            self.enter(start)?;
            self.consume()?;
            let operand_start = self.token_start;
            let (operand, depth) = self.parse_unary()?;
            self.leave();
            return Ok((self.scalar(operand, operand_start)?, depth));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Parsed> {
        let start = self.token_start;

        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok((FormulaExpr::Number(n), 1))
            }

            Token::Reference(text) => {
                self.consume()?;
                Ok((self.parse_reference(&text, start)?, 1))
            }

            Token::Identifier(name) => {
                self.consume()?;
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name, start)
                } else {
                    Err(FormulaError::parse(
                        start,
                        format!("Unknown name '{}'", name),
                    ))
                }
            }

            Token::LeftParen => {
                self.enter(start)?;
                self.consume()?;
                let inner_start = self.token_start;
                let (expr, depth) = self.parse_expression()?;
                let expr = self.scalar(expr, inner_start)?;
                self.expect(&Token::RightParen)?;
                self.leave();
                Ok((expr, depth))
            }

            Token::Eof => Err(FormulaError::parse(start, "Unexpected end of formula")),

            token => Err(FormulaError::parse(
                start,
                format!("Unexpected {}", token),
            )),
        }
    }

    /// A single reference, or a range when a `:` follows
    fn parse_reference(&mut self, text: &str, start: usize) -> FormulaResult<FormulaExpr> {
        let address = CellAddress::parse(text).map_err(|e| FormulaError::InvalidReference {
            position: start,
            message: e.to_string(),
        })?;

        if !matches!(self.current_token(), Token::Colon) {
            return Ok(FormulaExpr::CellRef(address));
        }

        self.consume()?;
        let end_start = self.token_start;
        let end = match self.consume()? {
            Token::Reference(end_text) => {
                CellAddress::parse(&end_text).map_err(|e| FormulaError::RangeMismatch {
                    position: end_start,
                    message: e.to_string(),
                })?
            }
            token => {
                return Err(FormulaError::RangeMismatch {
                    position: end_start,
                    message: format!("Expected a reference after ':', got {}", token),
                })
            }
        };

        let range = CellRange::linear(address, end).map_err(|e| FormulaError::RangeMismatch {
            position: start,
            message: e.to_string(),
        })?;

        Ok(FormulaExpr::RangeRef(range))
    }

    fn parse_function_call(&mut self, name: String, start: usize) -> FormulaResult<Parsed> {
        let def = functions::registry()
            .get(&name)
            .ok_or_else(|| FormulaError::UnknownFunction {
                position: start,
                name: name.clone(),
            })?;

        self.enter(start)?;
        self.expect(&Token::LeftParen)?;

        // Parse arguments, remembering where each one starts
        let mut args = Vec::new();
        let mut depth = 0;
        if !matches!(self.current_token(), Token::RightParen) {
            loop {
                let arg_start = self.token_start;
                if matches!(self.current_token(), Token::Comma | Token::RightParen) {
                    return Err(FormulaError::parse(arg_start, "Empty function argument"));
                }
                let (arg, arg_depth) = self.parse_expression()?;
                depth = depth.max(arg_depth);
                args.push((arg_start, arg));

                if matches!(self.current_token(), Token::Comma) {
                    self.consume()?;
                } else {
                    break;
                }
            }
        }

        self.expect(&Token::RightParen)?;
        self.leave();

        if args.len() != def.params.len() {
            return Err(FormulaError::parse(
                start,
                format!(
                    "{} takes {} argument(s), got {}",
                    def.name,
                    def.params.len(),
                    args.len()
                ),
            ));
        }

        let mut checked = Vec::with_capacity(args.len());
        for ((arg_start, arg), param) in args.into_iter().zip(def.params) {
            let arg = match param {
                Param::Range if matches!(arg, FormulaExpr::RangeRef(_)) => arg,
                Param::Range => {
                    return Err(FormulaError::parse(
                        arg_start,
                        format!("{} expects a range argument such as A1:A3", def.name),
                    ))
                }
                Param::Value => self.scalar(arg, arg_start)?,
            };
            checked.push(arg);
        }

        let expr = FormulaExpr::Function {
            name: def.name.to_string(),
            args: checked,
        };
        Ok((expr, node_depth(start, depth)?))
    }
}

/// Depth of a node over children at most `child` deep
fn node_depth(position: usize, child: usize) -> FormulaResult<usize> {
    let depth = child + 1;
    if depth > MAX_DEPTH {
        return Err(too_deep(position));
    }
    Ok(depth)
}

fn too_deep(position: usize) -> FormulaError {
    FormulaError::parse(
        position,
        format!("Formula is nested deeper than {} levels", MAX_DEPTH),
    )
}
