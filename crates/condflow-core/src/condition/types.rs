//! Condition AST node types

use super::clause::{write_list, ClauseElement};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational operators of a simple comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// `field = null`
    IsNull,
    /// `field != null`
    NotNull,
}

impl ComparisonOperator {
    /// Operators that take no right-hand side
    pub fn is_unary(&self) -> bool {
        matches!(self, ComparisonOperator::IsNull | ComparisonOperator::NotNull)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::IsNull => "= null",
            ComparisonOperator::NotNull => "!= null",
        }
    }
}

/// Set membership and range operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOperator {
    /// `x = {a, b}`
    In,
    /// `x != {a, b}`
    NotIn,
    /// `x = [low, high]`
    InRange,
    /// `x != [low, high]`
    NotInRange,
}

impl SetOperator {
    pub fn new(negated: bool, range: bool) -> Self {
        match (negated, range) {
            (false, false) => SetOperator::In,
            (true, false) => SetOperator::NotIn,
            (false, true) => SetOperator::InRange,
            (true, true) => SetOperator::NotInRange,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, SetOperator::InRange | SetOperator::NotInRange)
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, SetOperator::NotIn | SetOperator::NotInRange)
    }
}

/// Parenthesised group; evaluates as the AND of its children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupCondition {
    pub children: Vec<Condition>,
    pub closed: bool,
}

impl GroupCondition {
    pub fn validate(&self) -> Result<()> {
        if self.children.is_empty() {
            return Err(CoreError::Validation("group has no conditions".to_string()));
        }
        Ok(())
    }
}

/// Shared shape of `And` and `Or` nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalCondition {
    pub left: Option<Box<Condition>>,
    pub right: Option<Box<Condition>>,
    pub closed: bool,
}

impl LogicalCondition {
    pub fn with_left(left: Condition) -> Self {
        Self {
            left: Some(Box::new(left)),
            right: None,
            closed: false,
        }
    }

    pub fn new(left: Condition, right: Condition) -> Self {
        Self {
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            closed: true,
        }
    }

    pub fn validate(&self, kind: &str) -> Result<()> {
        if self.left.is_none() {
            return Err(CoreError::Validation(format!("{} is missing its left side", kind)));
        }
        if self.right.is_none() {
            return Err(CoreError::Validation(format!("{} is missing its right side", kind)));
        }
        Ok(())
    }
}

/// `left <op> right`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: ClauseElement,
    /// Filled in when the operator token arrives
    pub operator: Option<ComparisonOperator>,
    pub right: Option<ClauseElement>,
}

impl Comparison {
    pub fn open(left: ClauseElement) -> Self {
        Self {
            left,
            operator: None,
            right: None,
        }
    }

    pub fn new(left: ClauseElement, operator: ComparisonOperator, right: Option<ClauseElement>) -> Self {
        Self {
            left,
            operator: Some(operator),
            right,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let operator = self.operator.ok_or_else(|| {
            CoreError::Validation(format!("comparison on '{}' has no operator", self.left))
        })?;
        if !self.left.references_variable() {
            return Err(CoreError::Validation(format!(
                "left side of a comparison must be a variable, found '{}'",
                self.left
            )));
        }
        match (operator.is_unary(), &self.right) {
            (false, None) => Err(CoreError::Validation(format!(
                "comparison '{} {}' is missing its right side",
                self.left,
                operator.as_str()
            ))),
            (true, Some(right)) => Err(CoreError::Validation(format!(
                "null check on '{}' cannot take a value, found '{}'",
                self.left, right
            ))),
            _ => Ok(()),
        }
    }
}

/// `left = {a, b}` / `left != [low, high]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetComparison {
    pub left: ClauseElement,
    pub operator: SetOperator,
    pub values: Vec<ClauseElement>,
    pub closed: bool,
}

impl SetComparison {
    pub fn open(left: ClauseElement, operator: SetOperator) -> Self {
        Self {
            left,
            operator,
            values: Vec::new(),
            closed: false,
        }
    }

    /// The values as a single list element
    pub fn value_list(&self) -> ClauseElement {
        ClauseElement::ValueList(self.values.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.left.is_variable() {
            return Err(CoreError::Validation(format!(
                "set comparison must test a variable, found '{}'",
                self.left
            )));
        }
        if self.values.is_empty() {
            return Err(CoreError::Validation(format!(
                "set comparison on '{}' has no values",
                self.left
            )));
        }
        if self.operator.is_range() && self.values.len() < 2 {
            return Err(CoreError::Validation(format!(
                "range on '{}' needs a low and a high bound",
                self.left
            )));
        }
        Ok(())
    }
}

/// Condition AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Group(GroupCondition),
    And(LogicalCondition),
    Or(LogicalCondition),
    Comparison(Comparison),
    SetComparison(SetComparison),
}

impl Condition {
    /// Short name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::Group(_) => "group",
            Condition::And(_) => "and",
            Condition::Or(_) => "or",
            Condition::Comparison(_) => "comparison",
            Condition::SetComparison(_) => "set comparison",
        }
    }

    /// Validate this node only (children are validated when they close)
    pub fn validate(&self) -> Result<()> {
        match self {
            Condition::Group(group) => group.validate(),
            Condition::And(logical) => logical.validate("and"),
            Condition::Or(logical) => logical.validate("or"),
            Condition::Comparison(cmp) => cmp.validate(),
            Condition::SetComparison(set) => set.validate(),
        }
    }

    /// Validate this node and every descendant, including closed flags
    pub fn validate_tree(&self) -> Result<()> {
        self.validate()?;
        match self {
            Condition::Group(group) => {
                if !group.closed {
                    return Err(CoreError::Validation("group is not closed".to_string()));
                }
                group.children.iter().try_for_each(Condition::validate_tree)
            }
            Condition::And(logical) | Condition::Or(logical) => {
                if !logical.closed {
                    return Err(CoreError::Validation(format!("{} is not closed", self.kind())));
                }
                for side in [&logical.left, &logical.right].into_iter().flatten() {
                    side.validate_tree()?;
                }
                Ok(())
            }
            Condition::Comparison(_) => Ok(()),
            Condition::SetComparison(set) => {
                if !set.closed {
                    return Err(CoreError::Validation(format!(
                        "set comparison on '{}' is not closed",
                        set.left
                    )));
                }
                Ok(())
            }
        }
    }

    /// Every variable name referenced anywhere in the tree
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Group(group) => {
                for child in &group.children {
                    child.collect_variables(out);
                }
            }
            Condition::And(logical) | Condition::Or(logical) => {
                for side in [&logical.left, &logical.right].into_iter().flatten() {
                    side.collect_variables(out);
                }
            }
            Condition::Comparison(cmp) => {
                cmp.left.variables(out);
                if let Some(right) = &cmp.right {
                    right.variables(out);
                }
            }
            Condition::SetComparison(set) => {
                set.left.variables(out);
                for value in &set.values {
                    value.variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Group(group) => {
                write!(f, "(")?;
                for (i, child) in group.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Condition::And(logical) | Condition::Or(logical) => {
                let symbol = if matches!(self, Condition::And(_)) { "&&" } else { "||" };
                match &logical.left {
                    Some(left) => write!(f, "{}", left)?,
                    None => write!(f, "?")?,
                }
                write!(f, " {} ", symbol)?;
                match &logical.right {
                    Some(right) => write!(f, "{}", right),
                    None => write!(f, "?"),
                }
            }
            Condition::Comparison(cmp) => {
                write!(f, "{}", cmp.left)?;
                if let Some(op) = cmp.operator {
                    write!(f, " {}", op.as_str())?;
                }
                if let Some(right) = &cmp.right {
                    write!(f, " {}", right)?;
                }
                Ok(())
            }
            Condition::SetComparison(set) => {
                let symbol = if set.operator.is_negated() { "!=" } else { "=" };
                let (open, close) = if set.operator.is_range() { ('[', ']') } else { ('{', '}') };
                write!(f, "{} {} {}", set.left, symbol, open)?;
                write_list(f, &set.values)?;
                write!(f, "{}", close)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn var(name: &str) -> ClauseElement {
        ClauseElement::Variable(name.to_string())
    }

    fn num(n: f64) -> ClauseElement {
        ClauseElement::Literal(Value::Number(n))
    }

    fn cmp(name: &str, op: ComparisonOperator, n: f64) -> Condition {
        Condition::Comparison(Comparison::new(var(name), op, Some(num(n))))
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let group = GroupCondition::default();
        assert!(group.validate().is_err());
    }

    #[test]
    fn test_logical_requires_both_sides() {
        let logical = LogicalCondition::with_left(cmp("a", ComparisonOperator::Eq, 1.0));
        let err = logical.validate("and").unwrap_err();
        assert!(err.to_string().contains("right side"));
    }

    #[test]
    fn test_comparison_requires_variable_left() {
        let comparison = Comparison::new(num(1.0), ComparisonOperator::Eq, Some(num(1.0)));
        assert!(comparison.validate().is_err());
    }

    #[test]
    fn test_comparison_requires_right_unless_null_check() {
        let missing = Comparison::new(var("a"), ComparisonOperator::Gt, None);
        assert!(missing.validate().is_err());

        let null_check = Comparison::new(var("a"), ComparisonOperator::IsNull, None);
        assert!(null_check.validate().is_ok());
    }

    #[test]
    fn test_comparison_without_operator_is_invalid() {
        assert!(Comparison::open(var("a")).validate().is_err());
    }

    #[test]
    fn test_range_needs_two_bounds() {
        let mut set = SetComparison::open(var("x"), SetOperator::InRange);
        set.values.push(num(1.0));
        assert!(set.validate().is_err());
        set.values.push(num(10.0));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_set_operator_from_flags() {
        assert_eq!(SetOperator::new(false, false), SetOperator::In);
        assert_eq!(SetOperator::new(true, false), SetOperator::NotIn);
        assert_eq!(SetOperator::new(false, true), SetOperator::InRange);
        assert_eq!(SetOperator::new(true, true), SetOperator::NotInRange);
    }

    #[test]
    fn test_validate_tree_checks_closed_flags() {
        let tree = Condition::Group(GroupCondition {
            children: vec![cmp("a", ComparisonOperator::Eq, 1.0)],
            closed: false,
        });
        assert!(tree.validate_tree().is_err());

        let tree = Condition::Group(GroupCondition {
            children: vec![cmp("a", ComparisonOperator::Eq, 1.0)],
            closed: true,
        });
        assert!(tree.validate_tree().is_ok());
    }

    #[test]
    fn test_display_round_trip_shape() {
        let tree = Condition::Or(LogicalCondition::new(
            cmp("a", ComparisonOperator::Ge, 1.0),
            Condition::SetComparison(SetComparison {
                left: var("b"),
                operator: SetOperator::NotInRange,
                values: vec![num(1.0), num(10.0)],
                closed: true,
            }),
        ));
        assert_eq!(tree.to_string(), "a >= 1 || b != [1, 10]");
    }

    #[test]
    fn test_variables_collects_all_sides() {
        let tree = Condition::And(LogicalCondition::new(
            cmp("a", ComparisonOperator::Eq, 1.0),
            Condition::Comparison(Comparison::new(
                var("b"),
                ComparisonOperator::Lt,
                Some(var("c")),
            )),
        ));
        assert_eq!(tree.variables(), vec!["a", "b", "c"]);
    }
}
