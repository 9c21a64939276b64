//! Expression tokenizer
//!
//! Splits an expression such as `item.age >= 18 && item.name != 'bob'` into
//! `Value`, `QuotedString`, `Operator`, `GroupDelim` and `ListSeparator`
//! tokens. Operator symbols are matched longest first so `!=` is never read
//! as `!` followed by `=`, and `<<` never as two `<`.

use crate::error::{ParseError, Result};
use condflow_core::{Delimiter, OperatorSymbol, Token, TokenKind};

/// Tokenize an expression.
///
/// Fails only on an unterminated quoted literal. Empty input yields an
/// empty token list.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut word = Word::default();
    let mut pos = 0;

    while let Some(c) = input[pos..].chars().next() {
        if c.is_whitespace() {
            word.flush(&mut tokens);
            pos += c.len_utf8();
            continue;
        }

        if c == '"' || c == '\'' {
            word.flush(&mut tokens);
            let (text, end) = read_quoted(input, pos, c)?;
            tokens.push(Token::new(TokenKind::QuotedString, text, pos, end - pos));
            pos = end;
            continue;
        }

        if c == ',' {
            word.flush(&mut tokens);
            tokens.push(Token::separator(pos));
            pos += 1;
            continue;
        }

        if let Some(delim) = Delimiter::from_char(c) {
            word.flush(&mut tokens);
            tokens.push(Token::delimiter(delim, pos));
            pos += 1;
            continue;
        }

        if let Some((text, symbol)) = match_operator(&input[pos..]) {
            word.flush(&mut tokens);
            tokens.push(Token::operator(symbol, pos));
            pos += text.len();
            continue;
        }

        word.push(c, pos);
        pos += c.len_utf8();
    }
    word.flush(&mut tokens);

    log::trace!("tokenized {:?} into {} tokens", input, tokens.len());
    Ok(tokens)
}

fn match_operator(rest: &str) -> Option<(&'static str, OperatorSymbol)> {
    OperatorSymbol::LONGEST_FIRST
        .iter()
        .find(|(text, _)| rest.starts_with(text))
        .copied()
}

/// Read a quoted literal starting at `start` (the opening quote).
///
/// Returns the unescaped contents and the byte offset just past the
/// closing quote.
fn read_quoted(input: &str, start: usize, quote: char) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut chars = input[start + 1..].char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\'' | '\\'))) => text.push(escaped),
                Some((_, other)) => {
                    text.push('\\');
                    text.push(other);
                }
                None => break,
            },
            c if c == quote => return Ok((text, start + 1 + i + c.len_utf8())),
            c => text.push(c),
        }
    }

    Err(ParseError::Tokenizing {
        message: format!("unterminated quoted literal starting with {}", quote),
        offset: start,
    })
}

/// Accumulates a bare word or number
#[derive(Default)]
struct Word {
    text: String,
    start: usize,
}

impl Word {
    fn push(&mut self, c: char, pos: usize) {
        if self.text.is_empty() {
            self.start = pos;
        }
        self.text.push(c);
    }

    fn flush(&mut self, tokens: &mut Vec<Token>) {
        if !self.text.is_empty() {
            tokens.push(Token::value(std::mem::take(&mut self.text), self.start));
        }
    }
}
