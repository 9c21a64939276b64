//! Stack-based condition builder
//!
//! Consumes tokens one at a time and maintains a stack of the containers
//! still being built. Which action a token triggers depends only on the
//! kind of container on top of the stack and the class of the token; that
//! mapping lives in [`transition`] and every pair it does not list is a
//! parse error.
//!
//! A comparison closes as soon as its right operand is complete (at the next
//! logical operator, closing parenthesis or end of input). Groups and set
//! comparisons close only on their explicit terminator.

use crate::error::{ParseError, Result};
use condflow_core::{
    ClauseElement, Comparison, ComparisonOperator, Condition, Delimiter, GroupCondition,
    LogicalCondition, MathOperator, OperatorSymbol, SetComparison, SetOperator, Token, TokenKind,
};

/// Parse a token stream into a closed root `Group`.
pub fn parse(tokens: &[Token]) -> Result<Condition> {
    let mut builder = ConditionBuilder::new();
    for token in tokens {
        builder.feed(token)?;
    }
    let end = tokens.last().map(|t| t.offset + t.length).unwrap_or(0);
    builder.finish(end)
}

/// Token classes the transition table is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Operand,
    Compare,
    Math,
    Logical,
    OpenGroup,
    CloseGroup,
    OpenSet,
    CloseSet,
    Separator,
}

impl TokenClass {
    fn of(token: &Token) -> Self {
        match token.kind {
            TokenKind::Value | TokenKind::QuotedString => TokenClass::Operand,
            TokenKind::Operator(op) if op.is_comparison() => TokenClass::Compare,
            TokenKind::Operator(op) if op.is_logical() => TokenClass::Logical,
            TokenKind::Operator(_) => TokenClass::Math,
            TokenKind::GroupDelim(Delimiter::OpenParen) => TokenClass::OpenGroup,
            TokenKind::GroupDelim(Delimiter::CloseParen) => TokenClass::CloseGroup,
            TokenKind::GroupDelim(d) if d.is_open() => TokenClass::OpenSet,
            TokenKind::GroupDelim(_) => TokenClass::CloseSet,
            TokenKind::ListSeparator => TokenClass::Separator,
        }
    }
}

/// Container kinds the transition table is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Group,
    /// `And` / `Or` waiting for its right side
    Logical,
    Comparison,
    SetComparison,
}

impl ContainerKind {
    fn of(condition: &Condition) -> Self {
        match condition {
            Condition::Group(_) => ContainerKind::Group,
            Condition::And(_) | Condition::Or(_) => ContainerKind::Logical,
            Condition::Comparison(_) => ContainerKind::Comparison,
            Condition::SetComparison(_) => ContainerKind::SetComparison,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    OpenComparison,
    AttachOperand,
    SetOperator,
    ApplyMath,
    PushLogical,
    PushGroup,
    CloseGroup,
    OpenSet,
    AppendSetValue,
    NextSetValue,
    CloseSet,
    Reject,
}

fn transition(container: ContainerKind, class: TokenClass) -> Transition {
    use ContainerKind as C;
    use TokenClass as T;

    match (container, class) {
        (C::Group | C::Logical, T::Operand) => Transition::OpenComparison,
        (C::Group | C::Logical, T::OpenGroup) => Transition::PushGroup,
        (C::Group | C::Logical, T::Math) => Transition::ApplyMath,
        (C::Group, T::Logical) => Transition::PushLogical,
        (C::Group, T::CloseGroup) => Transition::CloseGroup,
        (C::Comparison, T::Operand) => Transition::AttachOperand,
        (C::Comparison, T::Compare) => Transition::SetOperator,
        (C::Comparison, T::Math) => Transition::ApplyMath,
        (C::Comparison, T::OpenSet) => Transition::OpenSet,
        (C::SetComparison, T::Operand) => Transition::AppendSetValue,
        (C::SetComparison, T::Math) => Transition::ApplyMath,
        (C::SetComparison, T::Separator) => Transition::NextSetValue,
        (C::SetComparison, T::CloseSet) => Transition::CloseSet,
        _ => Transition::Reject,
    }
}

/// Math operators waiting for the operand they apply to
#[derive(Debug, Default)]
struct OperandState {
    /// Binary operator whose right operand has not arrived yet
    pending: Option<MathOperator>,
    /// Prefix `-` / `~`, innermost last
    prefix: Vec<OperatorSymbol>,
}

impl OperandState {
    fn is_idle(&self) -> bool {
        self.pending.is_none() && self.prefix.is_empty()
    }

    fn apply_prefix(&mut self, mut element: ClauseElement) -> ClauseElement {
        while let Some(op) = self.prefix.pop() {
            element = match op {
                OperatorSymbol::BitNot => element.complement(),
                _ => element.negate(),
            };
        }
        element
    }

    /// Combine a new operand with the element built so far
    fn combine(
        &mut self,
        current: Option<ClauseElement>,
        element: ClauseElement,
    ) -> std::result::Result<ClauseElement, &'static str> {
        let element = self.apply_prefix(element);
        match (current, self.pending.take()) {
            (None, None) => Ok(element),
            (Some(existing), Some(op)) => Ok(existing.extend(op, element)),
            (Some(_), None) => Err("missing operator between operands"),
            (None, Some(_)) => Err("math operator is missing its left operand"),
        }
    }

    fn check_complete(&self, offset: usize) -> Result<()> {
        if let Some(op) = self.pending {
            return Err(ParseError::parsing(
                format!("operator '{}' is missing its right operand", op.as_str()),
                offset,
            ));
        }
        if let Some(op) = self.prefix.last() {
            return Err(ParseError::parsing(
                format!("operator '{}' is missing its operand", op.as_str()),
                offset,
            ));
        }
        Ok(())
    }
}

/// Function call whose closing parenthesis has not arrived yet
#[derive(Debug)]
struct PendingCall {
    name: String,
    args: Vec<ClauseElement>,
    current: Option<ClauseElement>,
    operand: OperandState,
}

impl PendingCall {
    fn expects_operand(&self) -> bool {
        self.current.is_none() || self.operand.pending.is_some()
    }
}

/// Incremental condition builder
#[derive(Debug, Default)]
pub struct ConditionBuilder {
    stack: Vec<Condition>,
    /// Last token fed, used to classify `{` / `[` from the preceding `=` / `!=`
    previous: Option<Token>,
    /// Bare word held back until we know whether it names a function
    held: Option<Token>,
    calls: Vec<PendingCall>,
    operand: OperandState,
    /// Inside a set, a value is expected next (after the opener or a comma)
    expect_value: bool,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next token
    pub fn feed(&mut self, token: &Token) -> Result<()> {
        if let Some(held) = self.held.take() {
            if token.kind == TokenKind::GroupDelim(Delimiter::OpenParen) {
                self.start_call(held)?;
                self.previous = Some(token.clone());
                return Ok(());
            }
            self.deliver_word(&held)?;
        }

        match token.kind {
            TokenKind::Value if ClauseElement::from_bare(&token.text).is_variable() => {
                self.held = Some(token.clone());
            }
            _ if !self.calls.is_empty() => self.feed_call(token)?,
            _ => {
                let element = Self::element_of(token);
                self.handle(TokenClass::of(token), token, element)?;
            }
        }

        self.previous = Some(token.clone());
        Ok(())
    }

    /// Finish the parse and return the closed root group
    pub fn finish(mut self, end: usize) -> Result<Condition> {
        if let Some(held) = self.held.take() {
            self.deliver_word(&held)?;
        }
        if let Some(call) = self.calls.last() {
            return Err(ParseError::parsing(
                format!("unclosed '(' in call to {}()", call.name),
                end,
            ));
        }
        if self.stack.is_empty() {
            return Err(ParseError::parsing("empty expression", end));
        }

        self.settle_comparison(end)?;

        if self.stack.len() > 1 {
            let message = match self.stack.last() {
                Some(Condition::SetComparison(set)) => {
                    let open = if set.operator.is_range() { '[' } else { '{' };
                    format!("unclosed '{}' in set comparison on '{}'", open, set.left)
                }
                Some(Condition::And(_)) => "'&&' is missing its right operand".to_string(),
                Some(Condition::Or(_)) => "'||' is missing its right operand".to_string(),
                _ => "unclosed '('".to_string(),
            };
            return Err(ParseError::parsing(message, end));
        }

        match self.stack.pop() {
            Some(Condition::Group(mut root)) => {
                root.validate()?;
                root.closed = true;
                let root = Condition::Group(root);
                log::debug!("parsed condition {}", root);
                Ok(root)
            }
            Some(other) => Err(ParseError::parsing(
                format!("dangling {} at end of input", other.kind()),
                end,
            )),
            None => Err(ParseError::parsing("empty expression", end)),
        }
    }

    fn element_of(token: &Token) -> Option<ClauseElement> {
        match token.kind {
            TokenKind::Value => Some(ClauseElement::from_bare(&token.text)),
            TokenKind::QuotedString => Some(ClauseElement::quoted(&token.text)),
            _ => None,
        }
    }

    fn deliver_word(&mut self, token: &Token) -> Result<()> {
        let element = ClauseElement::from_bare(&token.text);
        self.deliver_operand(element, token.offset)
    }

    /// Route a finished operand to the innermost open call or to the stack
    fn deliver_operand(&mut self, element: ClauseElement, offset: usize) -> Result<()> {
        match self.calls.last_mut() {
            Some(call) => {
                let current = call.current.take();
                call.current = Some(
                    call.operand
                        .combine(current, element)
                        .map_err(|msg| ParseError::parsing(msg, offset))?,
                );
                Ok(())
            }
            None => self.dispatch(TokenClass::Operand, "operand", offset, Some(element), None),
        }
    }

    fn handle(&mut self, class: TokenClass, token: &Token, element: Option<ClauseElement>) -> Result<()> {
        self.dispatch(class, &token.text, token.offset, element, Some(token))
    }

    fn dispatch(
        &mut self,
        class: TokenClass,
        text: &str,
        offset: usize,
        element: Option<ClauseElement>,
        token: Option<&Token>,
    ) -> Result<()> {
        if self.stack.is_empty() {
            self.stack.push(Condition::Group(GroupCondition::default()));
        }
        if matches!(class, TokenClass::Logical | TokenClass::CloseGroup) {
            self.settle_comparison(offset)?;
        }

        let kind = match self.stack.last() {
            Some(top) => ContainerKind::of(top),
            None => return Err(ParseError::parsing("no enclosing container", offset)),
        };

        match transition(kind, class) {
            Transition::OpenComparison => self.open_comparison(element, offset),
            Transition::AttachOperand => self.attach_operand(element, offset),
            Transition::SetOperator => self.set_operator(token, offset),
            Transition::ApplyMath => self.apply_math(token, offset),
            Transition::PushLogical => self.push_logical(token, offset),
            Transition::PushGroup => self.push_group(offset),
            Transition::CloseGroup => self.close_group(offset),
            Transition::OpenSet => self.open_set(token, offset),
            Transition::AppendSetValue => self.append_set_value(element, offset),
            Transition::NextSetValue => self.next_set_value(offset),
            Transition::CloseSet => self.close_set(token, offset),
            Transition::Reject => Err(self.reject(kind, class, text, offset)),
        }
    }

    fn reject(&self, kind: ContainerKind, class: TokenClass, text: &str, offset: usize) -> ParseError {
        let message = match (kind, class) {
            (ContainerKind::Logical, TokenClass::Logical | TokenClass::CloseGroup) => {
                format!("logical operator is missing its right operand before '{}'", text)
            }
            (ContainerKind::Group, TokenClass::Compare) => {
                format!("comparison operator '{}' is missing its left operand", text)
            }
            (_, TokenClass::CloseSet) | (_, TokenClass::OpenSet) => {
                format!("unexpected '{}'", text)
            }
            (ContainerKind::SetComparison, TokenClass::CloseGroup) => {
                format!("unmatched '{}' inside a value list", text)
            }
            _ => format!("unexpected '{}' in {:?}", text, kind),
        };
        ParseError::parsing(message, offset)
    }

    fn expects_operand(&self) -> bool {
        if let Some(call) = self.calls.last() {
            return call.expects_operand();
        }
        match self.stack.last() {
            Some(Condition::Comparison(cmp)) => {
                self.operand.pending.is_some() || (cmp.operator.is_some() && cmp.right.is_none())
            }
            Some(Condition::SetComparison(_)) => self.operand.pending.is_some() || self.expect_value,
            _ => true,
        }
    }

    fn open_comparison(&mut self, element: Option<ClauseElement>, offset: usize) -> Result<()> {
        if let Some(Condition::Group(group)) = self.stack.last() {
            if !group.children.is_empty() {
                return Err(ParseError::parsing(
                    "expected '&&' or '||' between conditions",
                    offset,
                ));
            }
        }
        let element = element.ok_or_else(|| ParseError::parsing("expected an operand", offset))?;
        let left = self
            .operand
            .combine(None, element)
            .map_err(|msg| ParseError::parsing(msg, offset))?;
        self.stack.push(Condition::Comparison(Comparison::open(left)));
        Ok(())
    }

    fn attach_operand(&mut self, element: Option<ClauseElement>, offset: usize) -> Result<()> {
        let element = element.ok_or_else(|| ParseError::parsing("expected an operand", offset))?;
        let Some(Condition::Comparison(cmp)) = self.stack.last_mut() else {
            return Err(ParseError::parsing("no comparison to attach to", offset));
        };

        let combined = match cmp.operator {
            // still extending the left side, e.g. `a + 1 > b`
            None => {
                let left = std::mem::replace(&mut cmp.left, ClauseElement::NullLiteral);
                self.operand.combine(Some(left), element)
            }
            Some(_) => self.operand.combine(cmp.right.take(), element),
        };
        let combined = combined.map_err(|msg| {
            let msg = if msg.starts_with("missing operator") {
                "expected '&&' or '||' after a complete comparison"
            } else {
                msg
            };
            ParseError::parsing(msg, offset)
        })?;

        if cmp.operator.is_none() {
            cmp.left = combined;
        } else {
            cmp.right = Some(combined);
        }
        Ok(())
    }

    fn set_operator(&mut self, token: Option<&Token>, offset: usize) -> Result<()> {
        let symbol = token.and_then(Token::operator_symbol);
        self.operand.check_complete(offset)?;
        let Some(Condition::Comparison(cmp)) = self.stack.last_mut() else {
            return Err(ParseError::parsing("no comparison to attach to", offset));
        };
        if cmp.operator.is_some() {
            return Err(ParseError::parsing(
                "comparison already has an operator; combine comparisons with '&&' or '||'",
                offset,
            ));
        }
        cmp.operator = Some(match symbol {
            Some(OperatorSymbol::Eq) => ComparisonOperator::Eq,
            Some(OperatorSymbol::Ne) => ComparisonOperator::Ne,
            Some(OperatorSymbol::Gt) => ComparisonOperator::Gt,
            Some(OperatorSymbol::Ge) => ComparisonOperator::Ge,
            Some(OperatorSymbol::Lt) => ComparisonOperator::Lt,
            Some(OperatorSymbol::Le) => ComparisonOperator::Le,
            _ => return Err(ParseError::parsing("expected a comparison operator", offset)),
        });
        Ok(())
    }

    fn apply_math(&mut self, token: Option<&Token>, offset: usize) -> Result<()> {
        let symbol = token
            .and_then(Token::operator_symbol)
            .ok_or_else(|| ParseError::parsing("expected a math operator", offset))?;
        let expects_operand = self.expects_operand();
        let state = match self.calls.last_mut() {
            Some(call) => &mut call.operand,
            None => &mut self.operand,
        };

        if expects_operand {
            if state.pending.is_some() && !matches!(symbol, OperatorSymbol::Sub | OperatorSymbol::BitNot) {
                return Err(ParseError::parsing(
                    format!("operator '{}' follows another operator", symbol.as_str()),
                    offset,
                ));
            }
            return match symbol {
                OperatorSymbol::Sub | OperatorSymbol::BitNot => {
                    state.prefix.push(symbol);
                    Ok(())
                }
                _ => Err(ParseError::parsing(
                    format!("operator '{}' is missing its left operand", symbol.as_str()),
                    offset,
                )),
            };
        }

        if !state.prefix.is_empty() {
            return Err(ParseError::parsing("dangling prefix operator", offset));
        }
        let op = MathOperator::from_symbol(symbol).ok_or_else(|| {
            ParseError::parsing(
                format!("'{}' is a prefix operator and cannot join two operands", symbol.as_str()),
                offset,
            )
        })?;
        state.pending = Some(op);
        Ok(())
    }

    fn push_logical(&mut self, token: Option<&Token>, offset: usize) -> Result<()> {
        let symbol = token.and_then(Token::operator_symbol);
        let Some(Condition::Group(group)) = self.stack.last_mut() else {
            return Err(ParseError::parsing(
                "logical operator has no enclosing container",
                offset,
            ));
        };
        let symbol_text = symbol.map(|s| s.as_str()).unwrap_or("?");
        let left = group.children.pop().ok_or_else(|| {
            ParseError::parsing(
                format!("'{}' is missing its left operand", symbol_text),
                offset,
            )
        })?;

        match symbol {
            // `&&` binds tighter than `||`: steal the right side of a finished Or
            Some(OperatorSymbol::And) => match left {
                Condition::Or(mut or) if or.right.is_some() => {
                    let stolen = or.right.take().map(|b| *b);
                    or.closed = false;
                    self.stack.push(Condition::Or(or));
                    match stolen {
                        Some(inner) => {
                            self.stack.push(Condition::And(LogicalCondition::with_left(inner)))
                        }
                        None => return Err(ParseError::parsing("'||' is missing its right operand", offset)),
                    }
                }
                other => self.stack.push(Condition::And(LogicalCondition::with_left(other))),
            },
            Some(OperatorSymbol::Or) => {
                self.stack.push(Condition::Or(LogicalCondition::with_left(left)))
            }
            _ => return Err(ParseError::parsing("expected '&&' or '||'", offset)),
        }
        Ok(())
    }

    fn push_group(&mut self, offset: usize) -> Result<()> {
        if let Some(Condition::Group(group)) = self.stack.last() {
            if !group.children.is_empty() {
                return Err(ParseError::parsing(
                    "expected '&&' or '||' between conditions",
                    offset,
                ));
            }
        }
        if !self.operand.is_idle() {
            return Err(ParseError::parsing(
                "prefix operators cannot apply to a parenthesised condition",
                offset,
            ));
        }
        self.stack.push(Condition::Group(GroupCondition::default()));
        Ok(())
    }

    fn close_group(&mut self, offset: usize) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(ParseError::parsing("unmatched ')'", offset));
        }
        match self.stack.pop() {
            Some(Condition::Group(mut group)) => {
                group.validate()?;
                group.closed = true;
                self.attach_condition(Condition::Group(group), offset)
            }
            _ => Err(ParseError::parsing("unmatched ')'", offset)),
        }
    }

    fn open_set(&mut self, token: Option<&Token>, offset: usize) -> Result<()> {
        let range = matches!(
            token.map(|t| t.kind),
            Some(TokenKind::GroupDelim(Delimiter::OpenBracket))
        );
        let negated = match self.previous.as_ref().and_then(Token::operator_symbol) {
            Some(OperatorSymbol::Eq) => false,
            Some(OperatorSymbol::Ne) => true,
            _ => {
                return Err(ParseError::parsing(
                    "a value list must directly follow '=' or '!='",
                    offset,
                ))
            }
        };
        self.operand.check_complete(offset)?;

        match self.stack.pop() {
            Some(Condition::Comparison(cmp)) if cmp.right.is_none() => {
                let operator = SetOperator::new(negated, range);
                self.stack
                    .push(Condition::SetComparison(SetComparison::open(cmp.left, operator)));
                self.expect_value = true;
                Ok(())
            }
            _ => Err(ParseError::parsing(
                "a value list must directly follow '=' or '!='",
                offset,
            )),
        }
    }

    fn append_set_value(&mut self, element: Option<ClauseElement>, offset: usize) -> Result<()> {
        let element = element.ok_or_else(|| ParseError::parsing("expected a value", offset))?;
        let expect_value = self.expect_value;
        let Some(Condition::SetComparison(set)) = self.stack.last_mut() else {
            return Err(ParseError::parsing("no value list to append to", offset));
        };

        let current = if expect_value { None } else { set.values.pop() };
        let value = self.operand.combine(current, element).map_err(|msg| {
            let msg = if msg.starts_with("missing operator") {
                "expected ',' between values"
            } else {
                msg
            };
            ParseError::parsing(msg, offset)
        })?;
        set.values.push(value);
        self.expect_value = false;
        Ok(())
    }

    fn next_set_value(&mut self, offset: usize) -> Result<()> {
        if self.expect_value {
            return Err(ParseError::parsing("expected a value before ','", offset));
        }
        self.operand.check_complete(offset)?;
        self.expect_value = true;
        Ok(())
    }

    fn close_set(&mut self, token: Option<&Token>, offset: usize) -> Result<()> {
        self.operand.check_complete(offset)?;
        let closing = token.and_then(|t| match t.kind {
            TokenKind::GroupDelim(d) => Some(d),
            _ => None,
        });

        match self.stack.pop() {
            Some(Condition::SetComparison(mut set)) => {
                let expected = if set.operator.is_range() {
                    Delimiter::CloseBracket
                } else {
                    Delimiter::CloseBrace
                };
                if closing != Some(expected) {
                    return Err(ParseError::parsing(
                        format!(
                            "mismatched delimiter: expected '{}'",
                            expected.as_char()
                        ),
                        offset,
                    ));
                }
                if self.expect_value && !set.values.is_empty() {
                    return Err(ParseError::parsing(
                        format!("expected a value before '{}'", expected.as_char()),
                        offset,
                    ));
                }
                self.expect_value = false;
                set.validate()?;
                set.closed = true;
                self.attach_condition(Condition::SetComparison(set), offset)
            }
            _ => Err(ParseError::parsing("unexpected closing delimiter", offset)),
        }
    }

    /// Close the comparison on top of the stack, if any, and attach it
    fn settle_comparison(&mut self, offset: usize) -> Result<()> {
        if !matches!(self.stack.last(), Some(Condition::Comparison(_))) {
            return Ok(());
        }
        self.operand.check_complete(offset)?;

        match self.stack.pop() {
            Some(Condition::Comparison(mut cmp)) => {
                if cmp.right == Some(ClauseElement::NullLiteral) {
                    match cmp.operator {
                        Some(ComparisonOperator::Eq) => {
                            cmp.operator = Some(ComparisonOperator::IsNull);
                            cmp.right = None;
                        }
                        Some(ComparisonOperator::Ne) => {
                            cmp.operator = Some(ComparisonOperator::NotNull);
                            cmp.right = None;
                        }
                        _ => {}
                    }
                }
                if cmp.operator.is_none() {
                    return Err(ParseError::parsing(
                        format!("'{}' is not followed by a comparison operator", cmp.left),
                        offset,
                    ));
                }
                if cmp.right.is_none() && cmp.operator.is_some_and(|op| !op.is_unary()) {
                    return Err(ParseError::parsing(
                        format!("comparison on '{}' is missing its right operand", cmp.left),
                        offset,
                    ));
                }
                cmp.validate()?;
                self.attach_condition(Condition::Comparison(cmp), offset)
            }
            _ => Ok(()),
        }
    }

    /// Hand a completed condition to the container below it.
    ///
    /// An `And`/`Or` receiving its right side is complete, so it is popped
    /// and handed on in turn.
    fn attach_condition(&mut self, mut condition: Condition, offset: usize) -> Result<()> {
        loop {
            match self.stack.last_mut() {
                Some(Condition::Group(group)) => {
                    group.children.push(condition);
                    return Ok(());
                }
                Some(Condition::And(logical)) | Some(Condition::Or(logical)) => {
                    logical.right = Some(Box::new(condition));
                    logical.closed = true;
                }
                Some(other) => {
                    return Err(ParseError::parsing(
                        format!("a condition cannot be nested in a {}", other.kind()),
                        offset,
                    ))
                }
                None => return Err(ParseError::parsing("no enclosing container", offset)),
            }

            match self.stack.pop() {
                Some(node) => {
                    node.validate()?;
                    condition = node;
                }
                None => return Err(ParseError::parsing("no enclosing container", offset)),
            }
        }
    }

    fn start_call(&mut self, name_token: Token) -> Result<()> {
        if !self.expects_operand() {
            return Err(ParseError::parsing(
                format!("unexpected call to {}()", name_token.text),
                name_token.offset,
            ));
        }
        if self.calls.is_empty() {
            if let Some(Condition::Group(group)) = self.stack.last() {
                if !group.children.is_empty() {
                    return Err(ParseError::parsing(
                        "expected '&&' or '||' between conditions",
                        name_token.offset,
                    ));
                }
            }
        }
        self.calls.push(PendingCall {
            name: name_token.text,
            args: Vec::new(),
            current: None,
            operand: OperandState::default(),
        });
        Ok(())
    }

    fn feed_call(&mut self, token: &Token) -> Result<()> {
        let offset = token.offset;
        match TokenClass::of(token) {
            TokenClass::Operand => match Self::element_of(token) {
                Some(element) => self.deliver_operand(element, offset),
                None => Err(ParseError::parsing("expected an operand", offset)),
            },
            TokenClass::Math => self.apply_math(Some(token), offset),
            TokenClass::Separator => {
                let Some(call) = self.calls.last_mut() else {
                    return Err(ParseError::parsing("unexpected ','", offset));
                };
                call.operand.check_complete(offset)?;
                match call.current.take() {
                    Some(arg) => {
                        call.args.push(arg);
                        Ok(())
                    }
                    None => Err(ParseError::parsing(
                        format!("expected an argument before ',' in call to {}()", call.name),
                        offset,
                    )),
                }
            }
            TokenClass::CloseGroup => {
                let Some(mut call) = self.calls.pop() else {
                    return Err(ParseError::parsing("unmatched ')'", offset));
                };
                call.operand.check_complete(offset)?;
                match call.current.take() {
                    Some(arg) => call.args.push(arg),
                    None if !call.args.is_empty() => {
                        return Err(ParseError::parsing(
                            format!("expected an argument before ')' in call to {}()", call.name),
                            offset,
                        ))
                    }
                    None => {}
                }
                let element = ClauseElement::FunctionCall {
                    name: call.name,
                    args: call.args,
                };
                self.deliver_operand(element, offset)
            }
            _ => {
                let name = self.calls.last().map(|c| c.name.as_str()).unwrap_or("?");
                Err(ParseError::parsing(
                    format!("unexpected '{}' inside call to {}()", token.text, name),
                    offset,
                ))
            }
        }
    }
}
