//! Unit tests for the public parsing API
//!
//! Exercises tokenize / parse as separate stages and parse_expression end
//! to end on realistic rule text.

use condflow_core::{ClauseElement, ComparisonOperator, Condition, SetOperator, TokenKind};
use condflow_parser::{parse, parse_expression, tokenize, ParseError};

// =============================================================================
// Helpers
// =============================================================================

fn only_child(condition: Condition) -> Condition {
    match condition {
        Condition::Group(mut group) => {
            assert!(group.closed);
            assert_eq!(group.children.len(), 1);
            group.children.remove(0)
        }
        other => panic!("root must be a group, got {:?}", other),
    }
}

// =============================================================================
// Stages
// =============================================================================

#[test]
fn test_stages_compose() -> anyhow::Result<()> {
    let tokens = tokenize("a = 1")?;
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].kind, TokenKind::Value);
    assert_eq!(tokens[1].text, "=");
    assert_eq!(tokens[2].offset, 4);

    assert_eq!(parse(&tokens)?, parse_expression("a = 1")?);
    Ok(())
}

#[test]
fn test_parse_with_no_tokens_fails() {
    let err = parse(&[]).unwrap_err();
    assert!(err.is_parsing());
}

// =============================================================================
// Realistic rules
// =============================================================================

#[test]
fn test_intake_rule() {
    let condition =
        parse_expression("order.amount > 100 && order.customer.country = {'US','CA'}").unwrap();

    assert_eq!(
        condition.variables(),
        vec!["order.amount", "order.customer.country"]
    );

    match only_child(condition) {
        Condition::And(and) => {
            assert!(matches!(
                and.left.as_deref(),
                Some(Condition::Comparison(cmp)) if cmp.operator == Some(ComparisonOperator::Gt)
            ));
            match and.right.as_deref() {
                Some(Condition::SetComparison(set)) => {
                    assert_eq!(set.operator, SetOperator::In);
                    assert_eq!(set.values.len(), 2);
                    assert_eq!(set.values[0], ClauseElement::quoted("US"));
                }
                other => panic!("expected set comparison, got {:?}", other),
            }
        }
        other => panic!("expected And, got {:?}", other),
    }
}

#[test]
fn test_scalar_set_and_range() {
    let set = only_child(parse_expression("x = {1,2,3}").unwrap());
    assert!(matches!(set, Condition::SetComparison(ref s) if s.operator == SetOperator::In));
    assert_eq!(set.to_string(), "x = {1, 2, 3}");

    let range = only_child(parse_expression("x != [1,10]").unwrap());
    assert!(matches!(range, Condition::SetComparison(ref s) if s.operator == SetOperator::NotInRange));
    assert_eq!(range.to_string(), "x != [1, 10]");
}

#[test]
fn test_display_normalizes_spacing() {
    let condition = parse_expression("a>=1&&(b='x'||c!=null)").unwrap();
    assert_eq!(condition.to_string(), "(a >= 1 && (b = \"x\" || c != null))");
}

#[test]
fn test_math_and_functions_in_operands() {
    let condition = parse_expression("len(name) + 1 > limit * 2").unwrap();
    assert_eq!(condition.to_string(), "((len(name) + 1) > (limit * 2))");
    assert_eq!(condition.variables(), vec!["name", "limit"]);
}

#[test]
fn test_prefix_operators_apply_to_a_single_operand() -> anyhow::Result<()> {
    let condition = parse_expression("~x & 1 = 1")?;
    assert_eq!(condition.to_string(), "((~x & 1) = 1)");

    let condition = parse_expression("~x + 1 = 0 - x")?;
    assert_eq!(condition.to_string(), "((~x + 1) = (0 - x))");

    let condition = parse_expression("a + -b * 2 > 0")?;
    assert_eq!(condition.to_string(), "((a + (-b * 2)) > 0)");
    Ok(())
}

#[test]
fn test_ast_serializes_to_json() {
    let condition = parse_expression("a = null").unwrap();
    let json = serde_json::to_value(&condition).unwrap();

    let cmp = &json["Group"]["children"][0]["Comparison"];
    assert_eq!(cmp["left"]["Variable"], "a");
    assert_eq!(cmp["operator"], "IsNull");
    assert!(cmp["right"].is_null());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_error_kinds() {
    assert!(matches!(parse_expression("a = 'open"), Err(ParseError::Tokenizing { .. })));
    assert!(parse_expression("a = 1 &&").unwrap_err().is_parsing());
    assert!(parse_expression("a = {}").unwrap_err().is_validation());
    assert!(parse_expression("").unwrap_err().is_parsing());
}

#[test]
fn test_parse_errors_carry_offsets() {
    match parse_expression("a = 1 )") {
        Err(ParseError::Parsing { offset, .. }) => assert_eq!(offset, 6),
        other => panic!("expected parsing error, got {:?}", other),
    }
}
