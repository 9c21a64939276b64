//! Tokens produced by the expression tokenizer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed operator symbols recognised by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorSymbol {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `~`
    BitNot,
}

impl OperatorSymbol {
    /// Symbols ordered longest first, so that no symbol is matched as the
    /// prefix of a longer one.
    pub const LONGEST_FIRST: [(&'static str, OperatorSymbol); 19] = [
        ("!=", OperatorSymbol::Ne),
        (">=", OperatorSymbol::Ge),
        ("<=", OperatorSymbol::Le),
        ("<<", OperatorSymbol::Shl),
        (">>", OperatorSymbol::Shr),
        ("&&", OperatorSymbol::And),
        ("||", OperatorSymbol::Or),
        ("=", OperatorSymbol::Eq),
        (">", OperatorSymbol::Gt),
        ("<", OperatorSymbol::Lt),
        ("+", OperatorSymbol::Add),
        ("-", OperatorSymbol::Sub),
        ("*", OperatorSymbol::Mul),
        ("/", OperatorSymbol::Div),
        ("%", OperatorSymbol::Mod),
        ("&", OperatorSymbol::BitAnd),
        ("|", OperatorSymbol::BitOr),
        ("^", OperatorSymbol::BitXor),
        ("~", OperatorSymbol::BitNot),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorSymbol::Eq => "=",
            OperatorSymbol::Ne => "!=",
            OperatorSymbol::Gt => ">",
            OperatorSymbol::Ge => ">=",
            OperatorSymbol::Lt => "<",
            OperatorSymbol::Le => "<=",
            OperatorSymbol::And => "&&",
            OperatorSymbol::Or => "||",
            OperatorSymbol::Add => "+",
            OperatorSymbol::Sub => "-",
            OperatorSymbol::Mul => "*",
            OperatorSymbol::Div => "/",
            OperatorSymbol::Mod => "%",
            OperatorSymbol::BitAnd => "&",
            OperatorSymbol::BitOr => "|",
            OperatorSymbol::BitXor => "^",
            OperatorSymbol::Shl => "<<",
            OperatorSymbol::Shr => ">>",
            OperatorSymbol::BitNot => "~",
        }
    }

    /// Returns true for `= != > >= < <=`
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorSymbol::Eq
                | OperatorSymbol::Ne
                | OperatorSymbol::Gt
                | OperatorSymbol::Ge
                | OperatorSymbol::Lt
                | OperatorSymbol::Le
        )
    }

    /// Returns true for `&&` and `||`
    pub fn is_logical(&self) -> bool {
        matches!(self, OperatorSymbol::And | OperatorSymbol::Or)
    }

    /// Returns true for the arithmetic and bitwise operators, including `~`
    pub fn is_math(&self) -> bool {
        !self.is_comparison() && !self.is_logical()
    }
}

/// Grouping delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
}

impl Delimiter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Delimiter::OpenParen),
            ')' => Some(Delimiter::CloseParen),
            '[' => Some(Delimiter::OpenBracket),
            ']' => Some(Delimiter::CloseBracket),
            '{' => Some(Delimiter::OpenBrace),
            '}' => Some(Delimiter::CloseBrace),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Delimiter::OpenParen => '(',
            Delimiter::CloseParen => ')',
            Delimiter::OpenBracket => '[',
            Delimiter::CloseBracket => ']',
            Delimiter::OpenBrace => '{',
            Delimiter::CloseBrace => '}',
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Delimiter::OpenParen | Delimiter::OpenBracket | Delimiter::OpenBrace
        )
    }

    /// The delimiter that closes this one (identity for closing delimiters)
    pub fn closing(&self) -> Delimiter {
        match self {
            Delimiter::OpenParen => Delimiter::CloseParen,
            Delimiter::OpenBracket => Delimiter::CloseBracket,
            Delimiter::OpenBrace => Delimiter::CloseBrace,
            other => *other,
        }
    }
}

/// Token kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Bare literal or identifier (`amount`, `42`, `true`)
    Value,
    /// Quoted literal; the token text holds the unescaped contents
    QuotedString,
    Operator(OperatorSymbol),
    GroupDelim(Delimiter),
    /// `,`
    ListSeparator,
}

/// A lexed token with its position in the source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character in the source
    pub offset: usize,
    /// Byte length of the token in the source (including quotes)
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            length,
        }
    }

    pub fn value(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let length = text.len();
        Self::new(TokenKind::Value, text, offset, length)
    }

    pub fn operator(symbol: OperatorSymbol, offset: usize) -> Self {
        let text = symbol.as_str();
        Self::new(TokenKind::Operator(symbol), text, offset, text.len())
    }

    pub fn delimiter(delim: Delimiter, offset: usize) -> Self {
        Self::new(TokenKind::GroupDelim(delim), delim.as_char().to_string(), offset, 1)
    }

    pub fn separator(offset: usize) -> Self {
        Self::new(TokenKind::ListSeparator, ",", offset, 1)
    }

    /// Returns the operator symbol if this is an operator token
    pub fn operator_symbol(&self) -> Option<OperatorSymbol> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Value => write!(f, "Value({})", self.text),
            TokenKind::QuotedString => write!(f, "QuotedString({:?})", self.text),
            TokenKind::Operator(op) => write!(f, "Operator({})", op.as_str()),
            TokenKind::GroupDelim(d) => write!(f, "GroupDelim({})", d.as_char()),
            TokenKind::ListSeparator => write!(f, "ListSeparator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_first_ordering() {
        // every symbol appears after all longer symbols it is a prefix of
        let table = OperatorSymbol::LONGEST_FIRST;
        for (i, (short, _)) in table.iter().enumerate() {
            for (long, _) in table.iter().skip(i + 1) {
                assert!(
                    !(long.len() > short.len() && long.starts_with(short)),
                    "'{}' must come before '{}'",
                    long,
                    short
                );
            }
        }
    }

    #[test]
    fn test_operator_classes() {
        assert!(OperatorSymbol::Ge.is_comparison());
        assert!(OperatorSymbol::Or.is_logical());
        assert!(OperatorSymbol::Shl.is_math());
        assert!(OperatorSymbol::BitNot.is_math());
        assert!(!OperatorSymbol::Eq.is_math());
    }

    #[test]
    fn test_delimiter_closing() {
        assert_eq!(Delimiter::OpenBrace.closing(), Delimiter::CloseBrace);
        assert_eq!(Delimiter::OpenBracket.closing(), Delimiter::CloseBracket);
        assert!(Delimiter::OpenParen.is_open());
        assert!(!Delimiter::CloseParen.is_open());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::value("a", 0).to_string(), "Value(a)");
        assert_eq!(Token::operator(OperatorSymbol::Ne, 2).to_string(), "Operator(!=)");
        assert_eq!(Token::separator(5).to_string(), "ListSeparator");
    }
}
