//! # Expression Evaluator
//!
//! Evaluates the `math` field of statements.
//!
//! Every expression has exactly one of four outcomes ([`Evaluation`]):
//!
//! | Outcome | Diagnostic |
//! |---------|------------|
//! | `Satisfied` | none |
//! | `Falsified` | `MATH FAIL` |
//! | `NonBoolean(v)` | `MATH EVAL` with `v` to four places |
//! | `Failed(e)` | `MATH ERROR` with the cause |
//!
//! ## Grammar
//!
//! Operator precedence follows Python, lowest first:
//!
//! ```text
//! or  ->  and  ->  not  ->  < <= > >= == != (chained)  ->  |  ->  &
//!     ->  + -  ->  * / // %  ->  unary - + ~  ->  ** ^ (right assoc)
//! ```
//!
//! Literals: numbers (`2`, `0.5`, `1e-3`), `True`, `False`, constants
//! `pi` and `E`. Functions: `sqrt exp log ln abs floor ceiling min max
//! sin cos tan`. Any other name is an undefined symbol.

use crate::diagnostic::{Category, Diagnostic};
use crate::document::Document;
use crate::primitives::{MATH_VALUE_PRECISION, MAX_EXPRESSION_DEPTH, MAX_EXPRESSION_LENGTH};
use thiserror::Error;

// =============================================================================
// OUTCOMES
// =============================================================================

/// Outcome of evaluating one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Reduced to boolean true.
    Satisfied,
    /// Reduced to boolean false.
    Falsified,
    /// Reduced to a finite number rather than a boolean.
    NonBoolean(f64),
    /// Could not be parsed or evaluated.
    Failed(ExpressionError),
}

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// Input ended where an operand or `)` was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A token that does not fit the grammar.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The offending source text.
        token: String,
        /// Byte offset in the expression.
        position: usize,
    },

    /// A character that starts no token.
    #[error("invalid character '{character}' at position {position}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Byte offset in the expression.
        position: usize,
    },

    /// A malformed numeric literal.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A name that is neither a constant nor a bound value.
    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),

    /// A call to a function that does not exist.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A call with the wrong number of arguments.
    #[error("{name}() takes {expected} argument(s), {found} given")]
    Arity {
        /// Function name.
        name: String,
        /// Accepted argument count, e.g. "1" or "1 or 2".
        expected: &'static str,
        /// Supplied argument count.
        found: usize,
    },

    /// An operator applied to an operand of the wrong kind.
    #[error("cannot apply '{operator}' to a {operand}")]
    TypeMismatch {
        /// Operator or function name.
        operator: String,
        /// Kind of the offending operand.
        operand: &'static str,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A function argument outside its domain.
    #[error("math domain error in {0}()")]
    Domain(&'static str),

    /// The result is infinite or NaN.
    #[error("result is not a finite number")]
    NonFinite,

    /// Nesting deeper than the parser accepts.
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    /// Input longer than the parser accepts.
    #[error("expression is longer than {0} bytes")]
    TooLong(usize),
}

// =============================================================================
// PUBLIC ENTRY POINTS
// =============================================================================

/// Evaluate an expression string.
#[must_use]
pub fn evaluate(expression: &str) -> Evaluation {
    match parse(expression).and_then(|ast| ast.eval()) {
        Ok(Value::Bool(true)) => Evaluation::Satisfied,
        Ok(Value::Bool(false)) => Evaluation::Falsified,
        Ok(Value::Number(n)) if n.is_finite() => Evaluation::NonBoolean(n),
        Ok(Value::Number(_)) => Evaluation::Failed(ExpressionError::NonFinite),
        Err(e) => Evaluation::Failed(e),
    }
}

/// Turn an evaluation of `expression`, owned by statement `owner`, into a
/// diagnostic. Satisfied expressions produce none.
#[must_use]
pub fn diagnose(owner: &str, expression: &str, evaluation: Evaluation) -> Option<Diagnostic> {
    match evaluation {
        Evaluation::Satisfied => None,
        Evaluation::Falsified => Some(Diagnostic::new(
            Category::MathFail,
            format!("[{owner}]: '{expression}' evaluates to False"),
        )),
        Evaluation::NonBoolean(value) => Some(Diagnostic::new(
            Category::MathEval,
            format!(
                "[{owner}]: '{expression}' = {value:.prec$} (not a boolean comparison)",
                prec = MATH_VALUE_PRECISION
            ),
        )),
        Evaluation::Failed(error) => Some(Diagnostic::new(
            Category::MathError,
            format!("[{owner}]: '{expression}' raised {error}"),
        )),
    }
}

/// Evaluate every `math` field in document order.
///
/// Statements without an expression are skipped.
#[must_use]
pub fn check_math(document: &Document) -> Vec<Diagnostic> {
    document
        .statements()
        .filter_map(|statement| {
            let expression = statement.math.as_deref()?;
            diagnose(&statement.id, expression, evaluate(expression))
        })
        .collect()
}

// =============================================================================
// LEXER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Ampersand,
    Pipe,
    Tilde,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone)]
struct Lexeme {
    token: Token,
    start: usize,
    end: usize,
}

fn tokenize(source: &str) -> Result<Vec<Lexeme>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut lexemes = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;

        if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            i = scan_number(bytes, i);
            let text = &source[start..i];
            let value: f64 = text
                .parse()
                .map_err(|_| ExpressionError::InvalidNumber(text.to_string()))?;
            lexemes.push(Lexeme {
                token: Token::Number(value),
                start,
                end: i,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let token = match &source[start..i] {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                name => Token::Ident(name.to_string()),
            };
            lexemes.push(Lexeme {
                token,
                start,
                end: i,
            });
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (token, width) = match (c, next) {
            (b'*', Some(b'*')) => (Token::Power, 2),
            (b'/', Some(b'/')) => (Token::DoubleSlash, 2),
            (b'<', Some(b'=')) => (Token::Le, 2),
            (b'>', Some(b'=')) => (Token::Ge, 2),
            (b'=', Some(b'=')) => (Token::EqEq, 2),
            (b'!', Some(b'=')) => (Token::Ne, 2),
            (b'^', _) => (Token::Power, 1),
            (b'*', _) => (Token::Star, 1),
            (b'/', _) => (Token::Slash, 1),
            (b'%', _) => (Token::Percent, 1),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'<', _) => (Token::Lt, 1),
            (b'>', _) => (Token::Gt, 1),
            (b'&', _) => (Token::Ampersand, 1),
            (b'|', _) => (Token::Pipe, 1),
            (b'~', _) => (Token::Tilde, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            (b',', _) => (Token::Comma, 1),
            _ => {
                let character = source[start..].chars().next().unwrap_or('?');
                return Err(ExpressionError::InvalidCharacter {
                    character,
                    position: start,
                });
            }
        };
        i += width;
        lexemes.push(Lexeme {
            token,
            start,
            end: i,
        });
    }

    Ok(lexemes)
}

/// Scan `digits [. digits] [e [+-] digits]`, returning the end offset.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

// =============================================================================
// PARSER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Compare {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Binary {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unary {
    Neg,
    Pos,
    Invert,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Bool(bool),
    Symbol(String),
    Unary(Unary, Box<Expr>),
    Binary(Binary, Box<Expr>, Box<Expr>),
    /// Left-associative run of one precedence level, kept flat so long
    /// chains neither recurse on evaluation nor on drop.
    Fold(Box<Expr>, Vec<(Binary, Expr)>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Chain(Box<Expr>, Vec<(Compare, Expr)>),
    Call(String, Vec<Expr>),
}

fn parse(source: &str) -> Result<Expr, ExpressionError> {
    if source.len() > MAX_EXPRESSION_LENGTH {
        return Err(ExpressionError::TooLong(MAX_EXPRESSION_LENGTH));
    }
    let lexemes = tokenize(source)?;
    let mut parser = Parser {
        source,
        lexemes: &lexemes,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;
    if parser.pos < lexemes.len() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser<'s> {
    source: &'s str,
    lexemes: &'s [Lexeme],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.lexemes.get(self.pos).map(|l| &l.token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExpressionError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ExpressionError {
        match self.lexemes.get(self.pos) {
            Some(lexeme) => ExpressionError::UnexpectedToken {
                token: self.source[lexeme.start..lexeme.end].to_string(),
                position: lexeme.start,
            },
            None => ExpressionError::UnexpectedEnd,
        }
    }

    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ExpressionError>,
    ) -> Result<T, ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(ExpressionError::TooDeep(MAX_EXPRESSION_DEPTH));
        }
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn or_expr(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.and_expr()?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::Or) {
            operands.push(self.and_expr()?);
        }
        Ok(Expr::Or(operands))
    }

    fn and_expr(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.not_expr()?;
        if self.peek() != Some(&Token::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::And) {
            operands.push(self.not_expr()?);
        }
        Ok(Expr::And(operands))
    }

    fn not_expr(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Self::not_expr)?;
            return Ok(Expr::Unary(Unary::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.bit_or()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => Compare::Lt,
                Some(Token::Le) => Compare::Le,
                Some(Token::Gt) => Compare::Gt,
                Some(Token::Ge) => Compare::Ge,
                Some(Token::EqEq) => Compare::Eq,
                Some(Token::Ne) => Compare::Ne,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.bit_or()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Chain(Box::new(first), rest))
        }
    }

    fn bit_or(&mut self) -> Result<Expr, ExpressionError> {
        self.fold(Self::bit_and, |token| match token {
            Token::Pipe => Some(Binary::BitOr),
            _ => None,
        })
    }

    fn bit_and(&mut self) -> Result<Expr, ExpressionError> {
        self.fold(Self::arith, |token| match token {
            Token::Ampersand => Some(Binary::BitAnd),
            _ => None,
        })
    }

    fn arith(&mut self) -> Result<Expr, ExpressionError> {
        self.fold(Self::term, |token| match token {
            Token::Plus => Some(Binary::Add),
            Token::Minus => Some(Binary::Sub),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        self.fold(Self::factor, |token| match token {
            Token::Star => Some(Binary::Mul),
            Token::Slash => Some(Binary::Div),
            Token::DoubleSlash => Some(Binary::FloorDiv),
            Token::Percent => Some(Binary::Mod),
            _ => None,
        })
    }

    /// `operand (op operand)*` for one left-associative precedence level.
    fn fold(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ExpressionError>,
        operator: fn(&Token) -> Option<Binary>,
    ) -> Result<Expr, ExpressionError> {
        let first = operand(self)?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            rest.push((op, operand(self)?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Fold(Box::new(first), rest))
        }
    }

    fn factor(&mut self) -> Result<Expr, ExpressionError> {
        let op = match self.peek() {
            Some(Token::Minus) => Unary::Neg,
            Some(Token::Plus) => Unary::Pos,
            Some(Token::Tilde) => Unary::Invert,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.nested(Self::factor)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.primary()?;
        if self.eat(&Token::Power) {
            let exponent = self.nested(Self::factor)?;
            return Ok(Expr::Binary(Binary::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        let lexemes = self.lexemes;
        let Some(lexeme) = lexemes.get(self.pos) else {
            return Err(ExpressionError::UnexpectedEnd);
        };
        match &lexeme.token {
            Token::Number(value) => {
                self.pos += 1;
                Ok(Expr::Number(*value))
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.nested(Self::or_expr)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.pos += 1;
                match name.as_str() {
                    "True" => return Ok(Expr::Bool(true)),
                    "False" => return Ok(Expr::Bool(false)),
                    _ => {}
                }
                if self.eat(&Token::LParen) {
                    let args = self.nested(Self::arguments)?;
                    return Ok(Expr::Call(name.clone(), args));
                }
                Ok(Expr::Symbol(name.clone()))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma-separated arguments after `(`, consuming the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, ExpressionError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.or_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen)?;
            return Ok(args);
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
        }
    }

    fn number(self, operator: &str) -> Result<f64, ExpressionError> {
        match self {
            Value::Number(n) => Ok(n),
            Value::Bool(_) => Err(mismatch(operator, self)),
        }
    }

    fn boolean(self, operator: &str) -> Result<bool, ExpressionError> {
        match self {
            Value::Bool(b) => Ok(b),
            Value::Number(_) => Err(mismatch(operator, self)),
        }
    }
}

fn mismatch(operator: &str, operand: Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operator: operator.to_string(),
        operand: operand.kind(),
    }
}

impl Expr {
    fn eval(&self) -> Result<Value, ExpressionError> {
        match self {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Symbol(name) => match name.as_str() {
                "pi" => Ok(Value::Number(std::f64::consts::PI)),
                "E" => Ok(Value::Number(std::f64::consts::E)),
                _ => Err(ExpressionError::UndefinedSymbol(name.clone())),
            },
            Expr::Unary(op, operand) => {
                let value = operand.eval()?;
                match op {
                    Unary::Neg => Ok(Value::Number(-value.number("-")?)),
                    Unary::Pos => Ok(Value::Number(value.number("+")?)),
                    Unary::Invert => Ok(Value::Bool(!value.boolean("~")?)),
                    Unary::Not => Ok(Value::Bool(!value.boolean("not")?)),
                }
            }
            Expr::And(operands) => {
                for operand in operands {
                    if !operand.eval()?.boolean("and")? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Or(operands) => {
                for operand in operands {
                    if operand.eval()?.boolean("or")? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expr::Binary(op, left, right) => binary(*op, left.eval()?, right.eval()?),
            Expr::Fold(first, rest) => rest
                .iter()
                .try_fold(first.eval()?, |acc, (op, expr)| binary(*op, acc, expr.eval()?)),
            Expr::Chain(first, rest) => {
                let mut left = first.eval()?;
                let mut holds = true;
                for (op, expr) in rest {
                    let right = expr.eval()?;
                    holds &= compare(*op, left, right)?;
                    left = right;
                }
                Ok(Value::Bool(holds))
            }
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(Expr::eval)
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, &values)
            }
        }
    }
}

fn binary(op: Binary, left: Value, right: Value) -> Result<Value, ExpressionError> {
    let symbol = match op {
        Binary::Add => "+",
        Binary::Sub => "-",
        Binary::Mul => "*",
        Binary::Div => "/",
        Binary::FloorDiv => "//",
        Binary::Mod => "%",
        Binary::Pow => "**",
        Binary::BitAnd => "&",
        Binary::BitOr => "|",
    };
    let number = |v: Value| v.number(symbol);
    let value = match op {
        Binary::BitAnd => Value::Bool(left.boolean(symbol)? & right.boolean(symbol)?),
        Binary::BitOr => Value::Bool(left.boolean(symbol)? | right.boolean(symbol)?),
        Binary::Add => Value::Number(number(left)? + number(right)?),
        Binary::Sub => Value::Number(number(left)? - number(right)?),
        Binary::Mul => Value::Number(number(left)? * number(right)?),
        Binary::Div => Value::Number(number(left)? / divisor(number(right)?)?),
        Binary::FloorDiv => Value::Number((number(left)? / divisor(number(right)?)?).floor()),
        Binary::Mod => {
            let a = number(left)?;
            let b = divisor(number(right)?)?;
            // Sign follows the divisor.
            Value::Number(a - b * (a / b).floor())
        }
        Binary::Pow => {
            let a = number(left)?;
            let b = number(right)?;
            if a == 0.0 && b < 0.0 {
                return Err(ExpressionError::DivisionByZero);
            }
            Value::Number(a.powf(b))
        }
    };
    Ok(value)
}

fn divisor(b: f64) -> Result<f64, ExpressionError> {
    if b == 0.0 {
        Err(ExpressionError::DivisionByZero)
    } else {
        Ok(b)
    }
}

fn compare(op: Compare, left: Value, right: Value) -> Result<bool, ExpressionError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(match op {
            Compare::Lt => a < b,
            Compare::Le => a <= b,
            Compare::Gt => a > b,
            Compare::Ge => a >= b,
            Compare::Eq => a == b,
            Compare::Ne => a != b,
        }),
        (Value::Bool(a), Value::Bool(b)) => match op {
            Compare::Eq => Ok(a == b),
            Compare::Ne => Ok(a != b),
            _ => Err(mismatch(compare_symbol(op), left)),
        },
        _ => match op {
            Compare::Eq => Ok(false),
            Compare::Ne => Ok(true),
            _ => {
                let offending = if matches!(left, Value::Bool(_)) {
                    left
                } else {
                    right
                };
                Err(mismatch(compare_symbol(op), offending))
            }
        },
    }
}

fn compare_symbol(op: Compare) -> &'static str {
    match op {
        Compare::Lt => "<",
        Compare::Le => "<=",
        Compare::Gt => ">",
        Compare::Ge => ">=",
        Compare::Eq => "==",
        Compare::Ne => "!=",
    }
}

fn call(name: &str, args: &[Value]) -> Result<Value, ExpressionError> {
    let arity = |expected: &'static str| ExpressionError::Arity {
        name: name.to_string(),
        expected,
        found: args.len(),
    };
    let unary = |f: fn(f64) -> Result<f64, ExpressionError>| -> Result<Value, ExpressionError> {
        match args {
            [x] => Ok(Value::Number(f(x.number(name)?)?)),
            _ => Err(arity("1")),
        }
    };

    match name {
        "sqrt" => unary(|x| {
            if x < 0.0 {
                Err(ExpressionError::Domain("sqrt"))
            } else {
                Ok(x.sqrt())
            }
        }),
        "exp" => unary(|x| Ok(x.exp())),
        "ln" => unary(natural_log),
        "log" => match args {
            [x] => Ok(Value::Number(natural_log(x.number(name)?)?)),
            [x, base] => {
                let base = base.number(name)?;
                if base <= 0.0 || base == 1.0 {
                    return Err(ExpressionError::Domain("log"));
                }
                Ok(Value::Number(natural_log(x.number(name)?)? / base.ln()))
            }
            _ => Err(arity("1 or 2")),
        },
        "abs" | "Abs" => unary(|x| Ok(x.abs())),
        "floor" => unary(|x| Ok(x.floor())),
        "ceiling" | "ceil" => unary(|x| Ok(x.ceil())),
        "sin" => unary(|x| Ok(x.sin())),
        "cos" => unary(|x| Ok(x.cos())),
        "tan" => unary(|x| Ok(x.tan())),
        "min" | "Min" | "max" | "Max" => {
            let mut numbers = args.iter().map(|v| v.number(name));
            let Some(first) = numbers.next() else {
                return Err(arity("at least 1"));
            };
            let pick_max = name.eq_ignore_ascii_case("max");
            numbers
                .try_fold(first?, |acc, next| -> Result<f64, ExpressionError> {
                    let next = next?;
                    Ok(if pick_max { acc.max(next) } else { acc.min(next) })
                })
                .map(Value::Number)
        }
        _ => Err(ExpressionError::UnknownFunction(name.to_string())),
    }
}

fn natural_log(x: f64) -> Result<f64, ExpressionError> {
    if x <= 0.0 {
        Err(ExpressionError::Domain("log"))
    } else {
        Ok(x.ln())
    }
}

// =============================================================================
// TESTS
// =============================================================================
