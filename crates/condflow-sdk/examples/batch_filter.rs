//! Batch filter example
//!
//! This example demonstrates:
//! - Running steps over a whole collection
//! - Per-element conditions with carry-over and filter modes

use condflow_sdk::{processor_fn, BatchPipeline, ExecutionContext, Response, Value};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Batch Filter Example ===\n");

    let mut pipeline = BatchPipeline::<Value>::new("readings");

    // Only the in-range readings reach the averaging step; the rest are dropped
    pipeline.add(
        processor_fn("keep_valid", |items: Vec<Value>, _ctx: &ExecutionContext| {
            Ok(Response::ok(items))
        }),
        Some("r.celsius = [-40, 60]"),
        Some("r"),
        true,
    )?;

    pipeline.add(
        processor_fn("report", |items: Vec<Value>, _ctx: &ExecutionContext| {
            let total: f64 = items
                .iter()
                .filter_map(|item| item.get_path(&["celsius"]).as_number())
                .sum();
            println!("  {} valid reading(s), mean {:.1}", items.len(), total / items.len() as f64);
            Ok(Response::ok(items))
        }),
        None,
        None,
        false,
    )?;

    let readings: Vec<Value> = [
        json!({"sensor": "a", "celsius": 21.5}),
        json!({"sensor": "b", "celsius": 999}),
        json!({"sensor": "c", "celsius": 19.0}),
        json!({"sensor": "d"}),
    ]
    .into_iter()
    .map(Value::from)
    .collect();

    let response = pipeline.execute(readings, &ExecutionContext::new());
    println!("\nState: {}", response.state);
    for item in response.data.unwrap_or_default() {
        println!("  {}", item);
    }

    Ok(())
}
