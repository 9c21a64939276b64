//! Unit tests for predicate compilation
//!
//! Covers field resolution, comparison and set semantics, literal coercion,
//! math and functions, and the compile-time errors.

use condflow_compiler::*;
use condflow_core::Value;
use serde_json::json;
use std::sync::Arc;
use std::thread;

// =============================================================================
// Fixtures
// =============================================================================

struct Customer {
    name: String,
    country: String,
    vip: bool,
}

struct Order {
    id: i64,
    amount: f64,
    coupon: Option<String>,
    tags: Vec<String>,
    customer: Customer,
}

impl Entity for Order {
    fn resolve_field(path: &str) -> Option<FieldAccessor<Self>> {
        order_fields().lookup(path)
    }
}

fn customer_fields() -> FieldRegistry<Customer> {
    FieldRegistry::new()
        .field("name", |c: &Customer| c.name.clone())
        .field("country", |c: &Customer| c.country.clone())
        .field("vip", |c: &Customer| c.vip)
}

fn order_fields() -> FieldRegistry<Order> {
    FieldRegistry::new()
        .field("id", |o: &Order| o.id)
        .field("amount", |o: &Order| o.amount)
        .field("coupon", |o: &Order| o.coupon.clone())
        .field("tags", |o: &Order| o.tags.clone())
        .nested("customer", |o: &Order| &o.customer, customer_fields())
}

fn order(amount: f64, country: &str) -> Order {
    Order {
        id: 7,
        amount,
        coupon: None,
        tags: vec!["new".to_string(), "web".to_string()],
        customer: Customer {
            name: "Ada Lovelace".to_string(),
            country: country.to_string(),
            vip: false,
        },
    }
}

fn record(value: serde_json::Value) -> Value {
    value.into()
}

// =============================================================================
// Comparisons
// =============================================================================

#[test]
fn test_typed_entity_comparison() {
    let predicate = compile_expression::<Order>("order.amount > 100", "order").unwrap();

    assert!(predicate.evaluate(&order(150.0, "US")));
    assert!(!predicate.evaluate(&order(100.0, "US")));
}

#[test]
fn test_all_ordering_operators() {
    let item = order(50.0, "US");
    let cases = [
        ("amount > 49", true),
        ("amount > 50", false),
        ("amount >= 50", true),
        ("amount < 50", false),
        ("amount <= 50", true),
        ("amount = 50", true),
        ("amount != 50", false),
    ];

    for (text, expected) in cases {
        let predicate = compile_expression::<Order>(text, "order").unwrap();
        assert_eq!(predicate.evaluate(&item), expected, "{}", text);
    }
}

#[test]
fn test_nested_field_path() {
    let predicate =
        compile_expression::<Order>("order.customer.country = 'CA'", "order").unwrap();

    assert!(predicate.evaluate(&order(10.0, "CA")));
    assert!(!predicate.evaluate(&order(10.0, "US")));
}

#[test]
fn test_string_ordering_is_lexicographic() {
    let predicate = compile_expression::<Order>("customer.name < 'B'", "").unwrap();
    assert!(predicate.evaluate(&order(1.0, "US")));
}

#[test]
fn test_literal_coercion() {
    let item = order(42.0, "US");

    let number_from_string = compile_expression::<Order>("amount = '42'", "").unwrap();
    assert!(number_from_string.evaluate(&item));

    let bool_from_string = compile_expression::<Order>("customer.vip = 'false'", "").unwrap();
    assert!(bool_from_string.evaluate(&item));

    let bool_literal = compile_expression::<Order>("customer.vip = false", "").unwrap();
    assert!(bool_literal.evaluate(&item));
}

#[test]
fn test_null_checks() {
    let mut with_coupon = order(1.0, "US");
    with_coupon.coupon = Some("SPRING".to_string());
    let without = order(1.0, "US");

    let is_null = compile_expression::<Order>("coupon = null", "").unwrap();
    let not_null = compile_expression::<Order>("coupon != null", "").unwrap();

    assert!(is_null.evaluate(&without));
    assert!(!is_null.evaluate(&with_coupon));
    assert!(not_null.evaluate(&with_coupon));
    assert!(!not_null.evaluate(&without));
}

#[test]
fn test_null_never_orders() {
    let predicate = compile_expression::<Value>("score > 0 || score <= 0", "").unwrap();
    assert!(!predicate.evaluate(&record(json!({}))));
    assert!(predicate.evaluate(&record(json!({"score": 0}))));
}

// =============================================================================
// Sets and ranges
// =============================================================================

#[test]
fn test_set_membership_on_bare_prefix() {
    let predicate = compile_expression::<i64>("x = {1,2,3}", "x").unwrap();
    assert!(predicate.evaluate(&2));
    assert!(!predicate.evaluate(&5));
}

#[test]
fn test_not_in_range_on_bare_prefix() {
    let predicate = compile_expression::<i64>("x != [1,10]", "x").unwrap();
    assert!(!predicate.evaluate(&5));
    assert!(predicate.evaluate(&20));
    assert!(!predicate.evaluate(&1));
    assert!(!predicate.evaluate(&10));
}

#[test]
fn test_in_range() {
    let predicate = compile_expression::<Order>("amount = [10, 20]", "").unwrap();
    assert!(predicate.evaluate(&order(10.0, "US")));
    assert!(predicate.evaluate(&order(15.5, "US")));
    assert!(!predicate.evaluate(&order(20.01, "US")));
}

#[test]
fn test_not_in_set_of_strings() {
    let predicate =
        compile_expression::<Order>("customer.country != {'US', 'CA'}", "").unwrap();
    assert!(predicate.evaluate(&order(1.0, "FR")));
    assert!(!predicate.evaluate(&order(1.0, "CA")));
}

#[test]
fn test_set_with_computed_members() {
    let predicate = compile_expression::<Value>("a = {b + 1, 100}", "").unwrap();
    assert!(predicate.evaluate(&record(json!({"a": 5, "b": 4}))));
    assert!(predicate.evaluate(&record(json!({"a": 100, "b": 0}))));
    assert!(!predicate.evaluate(&record(json!({"a": 5, "b": 5}))));
}

// =============================================================================
// Logic
// =============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let predicate = compile_expression::<Value>("a = 1 || b = 1 && c = 1", "").unwrap();

    assert!(predicate.evaluate(&record(json!({"a": 1, "b": 0, "c": 0}))));
    assert!(predicate.evaluate(&record(json!({"a": 0, "b": 1, "c": 1}))));
    assert!(!predicate.evaluate(&record(json!({"a": 0, "b": 1, "c": 0}))));
}

#[test]
fn test_groups_override_precedence() {
    let predicate = compile_expression::<Value>("(a = 1 || b = 1) && c = 1", "").unwrap();

    assert!(!predicate.evaluate(&record(json!({"a": 1, "b": 0, "c": 0}))));
    assert!(predicate.evaluate(&record(json!({"a": 1, "b": 0, "c": 1}))));
}

#[test]
fn test_intake_rule() {
    let predicate = compile_expression::<Order>(
        "order.amount > 100 && order.customer.country = {'US','CA'}",
        "order",
    )
    .unwrap();

    assert!(predicate.evaluate(&order(250.0, "US")));
    assert!(!predicate.evaluate(&order(250.0, "MX")));
    assert!(!predicate.evaluate(&order(50.0, "CA")));
}

// =============================================================================
// Math and functions
// =============================================================================

#[test]
fn test_arithmetic_in_operands() {
    let predicate = compile_expression::<Value>("a * 2 + 2 >= b - 3", "").unwrap();
    assert!(predicate.evaluate(&record(json!({"a": 4, "b": 13}))));
    assert!(!predicate.evaluate(&record(json!({"a": 4, "b": 14}))));
}

#[test]
fn test_division_by_zero_compares_false() {
    let predicate = compile_expression::<Value>("a / b > 0", "").unwrap();
    assert!(!predicate.evaluate(&record(json!({"a": 1, "b": 0}))));

    let is_null = compile_expression::<Value>("a / b = null", "").unwrap();
    assert!(is_null.evaluate(&record(json!({"a": 1, "b": 0}))));
}

#[test]
fn test_unary_minus() {
    let predicate = compile_expression::<Value>("delta > -5", "").unwrap();
    assert!(predicate.evaluate(&record(json!({"delta": -4}))));
    assert!(!predicate.evaluate(&record(json!({"delta": -6}))));
}

#[test]
fn test_complement_binds_tighter_than_binary_operators() -> anyhow::Result<()> {
    let low_bit_clear = compile_expression::<i64>("~x & 1 = 1", "x")?;
    assert!(low_bit_clear.evaluate(&2));
    assert!(!low_bit_clear.evaluate(&3));

    // two's complement: ~x + 1 == -x
    let twos = compile_expression::<i64>("~x + 1 = 0 - x", "x")?;
    for x in [1, 2, 7, -4] {
        assert!(twos.evaluate(&x), "failed for {}", x);
    }
    Ok(())
}

#[test]
fn test_negated_variable_binds_tighter_than_binary_operators() {
    let predicate = compile_expression::<i64>("-x * 2 + 1 = -5", "x").unwrap();
    assert!(predicate.evaluate(&3));
    assert!(!predicate.evaluate(&2));
}

#[test]
fn test_functions() {
    let item = order(1.0, "US");

    let len = compile_expression::<Order>("len(tags) = 2", "").unwrap();
    assert!(len.evaluate(&item));

    let lower = compile_expression::<Order>("lower(customer.name) = 'ada lovelace'", "").unwrap();
    assert!(lower.evaluate(&item));

    let abs = compile_expression::<Value>("abs(delta) < 3", "").unwrap();
    assert!(abs.evaluate(&record(json!({"delta": -2}))));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_field_is_validation_error() {
    let err = compile_expression::<Order>("order.weight > 1", "order").unwrap_err();
    match err {
        CompileError::Validation(msg) => assert!(msg.contains("order.weight")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_function_arity_is_checked() {
    let err = compile_expression::<Value>("len(a, b) = 1", "").unwrap_err();
    assert!(matches!(err, CompileError::Validation(_)));
}

#[test]
fn test_tokenizing_error_surfaces_as_parse_error() {
    let err = compile_expression::<Value>("a = 'open", "").unwrap_err();
    assert!(matches!(err, CompileError::Parse(e) if e.is_tokenizing()));
}

#[test]
fn test_custom_registry() {
    let registry = FieldRegistry::new()
        .field("len", |s: &String| s.len())
        .this(|s: &String| s.clone());

    let predicate = compile_expression_with_registry("word.len > 3 && word != 'hello'", &registry);
    assert!(predicate.evaluate(&"goodbye".to_string()));
    assert!(!predicate.evaluate(&"hello".to_string()));
    assert!(!predicate.evaluate(&"hi".to_string()));
}

fn compile_expression_with_registry(text: &str, registry: &FieldRegistry<String>) -> Predicate<String> {
    PredicateCompiler::new()
        .compile_expression_with(text, "word", registry)
        .unwrap()
}

// =============================================================================
// Reuse
// =============================================================================

#[test]
fn test_compiling_twice_agrees() {
    let text = "amount >= 10 && customer.country != {'FR'}";
    let first = compile_expression::<Order>(text, "").unwrap();
    let second = compile_expression::<Order>(text, "").unwrap();

    for item in [order(5.0, "US"), order(10.0, "US"), order(50.0, "FR")] {
        assert_eq!(first.evaluate(&item), second.evaluate(&item));
    }
}

#[test]
fn test_predicate_is_shareable_across_threads() {
    let predicate = Arc::new(compile_expression::<Value>("n % 2 = 0", "").unwrap());

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let predicate = Arc::clone(&predicate);
            thread::spawn(move || predicate.evaluate(&record(json!({ "n": n }))))
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, false, true, false]);
}

#[test]
fn test_compile_from_parsed_condition() {
    let condition = condflow_parser::parse_expression("id = 7").unwrap();
    let predicate = compile::<Order>(&condition, "").unwrap();
    assert!(predicate.evaluate(&order(1.0, "US")));
    assert_eq!(predicate.source(), condition.to_string());
}
