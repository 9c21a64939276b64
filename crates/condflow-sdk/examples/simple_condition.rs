//! Simple condition example
//!
//! This example demonstrates:
//! - Compiling an expression against a JSON record
//! - Evaluating the compiled predicate repeatedly

use condflow_sdk::{compile_expression, Value};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Simple Condition Example ===\n");

    let predicate = compile_expression::<Value>(
        "order.amount > 100 && order.country = {'US', 'CA'}",
        "order",
    )?;
    println!("Compiled: {}\n", predicate);

    let orders = [
        json!({"id": 1, "amount": 250, "country": "US"}),
        json!({"id": 2, "amount": 250, "country": "MX"}),
        json!({"id": 3, "amount": 80, "country": "CA"}),
        json!({"id": 4, "amount": "120", "country": "CA"}),
    ];

    for order in orders {
        let record = Value::from(order.clone());
        println!("  {} -> {}", order, predicate.evaluate(&record));
    }

    Ok(())
}
