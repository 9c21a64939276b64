//! Clause elements: the operands on either side of a comparison

use crate::token::OperatorSymbol;
use crate::types::{format_number, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary math operators usable inside clause elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl MathOperator {
    /// Map a binary operator symbol. `~` is unary and has no binary form.
    pub fn from_symbol(symbol: OperatorSymbol) -> Option<Self> {
        match symbol {
            OperatorSymbol::Add => Some(MathOperator::Add),
            OperatorSymbol::Sub => Some(MathOperator::Sub),
            OperatorSymbol::Mul => Some(MathOperator::Mul),
            OperatorSymbol::Div => Some(MathOperator::Div),
            OperatorSymbol::Mod => Some(MathOperator::Mod),
            OperatorSymbol::BitAnd => Some(MathOperator::BitAnd),
            OperatorSymbol::BitOr => Some(MathOperator::BitOr),
            OperatorSymbol::BitXor => Some(MathOperator::BitXor),
            OperatorSymbol::Shl => Some(MathOperator::Shl),
            OperatorSymbol::Shr => Some(MathOperator::Shr),
            _ => None,
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            MathOperator::Mul | MathOperator::Div | MathOperator::Mod => 5,
            MathOperator::Add | MathOperator::Sub => 4,
            MathOperator::Shl | MathOperator::Shr => 3,
            MathOperator::BitAnd => 2,
            MathOperator::BitXor => 1,
            MathOperator::BitOr => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Sub => "-",
            MathOperator::Mul => "*",
            MathOperator::Div => "/",
            MathOperator::Mod => "%",
            MathOperator::BitAnd => "&",
            MathOperator::BitOr => "|",
            MathOperator::BitXor => "^",
            MathOperator::Shl => "<<",
            MathOperator::Shr => ">>",
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `-x`
    Neg,
    /// `~x`
    BitNot,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::BitNot => "~",
        }
    }
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseElement {
    /// Field reference, possibly dotted (`item.address.city`)
    Variable(String),
    Literal(Value),
    /// The `null` keyword
    NullLiteral,
    BinaryOp {
        left: Box<ClauseElement>,
        op: MathOperator,
        right: Box<ClauseElement>,
    },
    /// Prefix operator; binds tighter than any binary operator
    Unary {
        op: UnaryOperator,
        operand: Box<ClauseElement>,
    },
    FunctionCall {
        name: String,
        args: Vec<ClauseElement>,
    },
    ValueList(Vec<ClauseElement>),
}

impl ClauseElement {
    /// Classify a bare `Value` token: numbers and booleans are literals,
    /// `null` is the null literal, anything else names a variable.
    pub fn from_bare(text: &str) -> Self {
        match text {
            "null" => ClauseElement::NullLiteral,
            "true" => ClauseElement::Literal(Value::Bool(true)),
            "false" => ClauseElement::Literal(Value::Bool(false)),
            _ => match text.parse::<f64>() {
                Ok(n) if !text.starts_with(|c: char| c.is_alphabetic()) => {
                    ClauseElement::Literal(Value::Number(n))
                }
                _ => ClauseElement::Variable(text.to_string()),
            },
        }
    }

    /// A quoted literal is always a string
    pub fn quoted(text: &str) -> Self {
        ClauseElement::Literal(Value::String(text.to_string()))
    }

    pub fn binary(left: ClauseElement, op: MathOperator, right: ClauseElement) -> Self {
        ClauseElement::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Append `op rhs` to this element, respecting operator precedence.
    ///
    /// Elements are built left to right, so a tighter-binding operator
    /// descends into the right spine of an existing `BinaryOp`.
    pub fn extend(self, op: MathOperator, rhs: ClauseElement) -> Self {
        match self {
            ClauseElement::BinaryOp {
                left,
                op: existing,
                right,
            } if op.precedence() > existing.precedence() => ClauseElement::BinaryOp {
                left,
                op: existing,
                right: Box::new(right.extend(op, rhs)),
            },
            other => ClauseElement::binary(other, op, rhs),
        }
    }

    /// Unary minus. Numeric literals are folded in place.
    pub fn negate(self) -> Self {
        match self {
            ClauseElement::Literal(Value::Number(n)) => ClauseElement::Literal(Value::Number(-n)),
            other => ClauseElement::unary(UnaryOperator::Neg, other),
        }
    }

    /// Bitwise complement
    pub fn complement(self) -> Self {
        ClauseElement::unary(UnaryOperator::BitNot, self)
    }

    pub fn unary(op: UnaryOperator, operand: ClauseElement) -> Self {
        ClauseElement::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, ClauseElement::Variable(_))
    }

    /// True if a variable appears anywhere in this element
    pub fn references_variable(&self) -> bool {
        match self {
            ClauseElement::Variable(_) => true,
            ClauseElement::Literal(_) | ClauseElement::NullLiteral => false,
            ClauseElement::BinaryOp { left, right, .. } => {
                left.references_variable() || right.references_variable()
            }
            ClauseElement::Unary { operand, .. } => operand.references_variable(),
            ClauseElement::FunctionCall { args, .. } | ClauseElement::ValueList(args) => {
                args.iter().any(ClauseElement::references_variable)
            }
        }
    }

    /// Collect every variable name referenced by this element
    pub fn variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ClauseElement::Variable(name) => out.push(name),
            ClauseElement::Literal(_) | ClauseElement::NullLiteral => {}
            ClauseElement::BinaryOp { left, right, .. } => {
                left.variables(out);
                right.variables(out);
            }
            ClauseElement::Unary { operand, .. } => operand.variables(out),
            ClauseElement::FunctionCall { args, .. } | ClauseElement::ValueList(args) => {
                for arg in args {
                    arg.variables(out);
                }
            }
        }
    }
}

impl fmt::Display for ClauseElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseElement::Variable(name) => write!(f, "{}", name),
            ClauseElement::Literal(Value::String(s)) => write!(f, "{:?}", s),
            ClauseElement::Literal(Value::Number(n)) => write!(f, "{}", format_number(*n)),
            ClauseElement::Literal(v) => write!(f, "{}", v),
            ClauseElement::NullLiteral => write!(f, "null"),
            ClauseElement::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            ClauseElement::Unary { op, operand } => write!(f, "{}{}", op.as_str(), operand),
            ClauseElement::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ClauseElement::ValueList(values) => {
                write!(f, "{{")?;
                write_list(f, values)?;
                write!(f, "}}")
            }
        }
    }
}

pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[ClauseElement]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
