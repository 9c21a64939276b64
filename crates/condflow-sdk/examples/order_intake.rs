//! Order intake example
//!
//! This example demonstrates:
//! - A typed entity exposing its fields through a registry
//! - Loading named pipelines from YAML and binding processors by name
//! - Reading the final state, data and recorded warnings

use condflow_sdk::{
    processor_fn, EngineBuilder, Entity, ExecutionContext, FieldAccessor, FieldRegistry,
    ProcessorCatalog, Response,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Order {
    id: u32,
    amount: f64,
    country: String,
    discount: f64,
    flags: Vec<String>,
}

impl Entity for Order {
    fn resolve_field(path: &str) -> Option<FieldAccessor<Self>> {
        FieldRegistry::new()
            .field("id", |o: &Order| o.id)
            .field("amount", |o: &Order| o.amount)
            .field("country", |o: &Order| o.country.clone())
            .field("discount", |o: &Order| o.discount)
            .field("flags", |o: &Order| o.flags.clone())
            .lookup(path)
    }
}

const PIPELINES: &str = r#"
default_prefix: order
pipelines:
  - name: intake
    steps:
      - processor: normalize_country
      - processor: loyalty_discount
        when: "order.amount >= 200"
      - processor: export_check
        when: "order.country != {'US', 'CA'}"
      - pipeline: review
        when: "len(order.flags) > 0"
  - name: review
    steps:
      - processor: manual_review
"#;

fn catalog() -> ProcessorCatalog<Order> {
    ProcessorCatalog::new()
        .with(processor_fn("normalize_country", |mut order: Order, _ctx: &ExecutionContext| {
            order.country = order.country.trim().to_uppercase();
            Ok(Response::ok(order))
        }))
        .with(processor_fn("loyalty_discount", |mut order: Order, _ctx: &ExecutionContext| {
            order.discount = 0.05;
            Ok(Response::ok(order))
        }))
        .with(processor_fn("export_check", |mut order: Order, _ctx: &ExecutionContext| {
            order.flags.push("export".to_string());
            let message = format!("order {} ships outside North America", order.id);
            Ok(Response::continue_with_error(order, anyhow::anyhow!(message)))
        }))
        .with(processor_fn("manual_review", |order: Order, _ctx: &ExecutionContext| {
            Ok(Response::stop_ok(order))
        }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "condflow_sdk=info,condflow_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Order Intake Example ===\n");

    let registry = EngineBuilder::new(catalog()).add_yaml(PIPELINES)?.build()?;
    let context = ExecutionContext::new();

    let orders = vec![
        Order {
            id: 1,
            amount: 320.0,
            country: " us ".to_string(),
            discount: 0.0,
            flags: Vec::new(),
        },
        Order {
            id: 2,
            amount: 90.0,
            country: "de".to_string(),
            discount: 0.0,
            flags: Vec::new(),
        },
    ];

    for order in orders {
        let response = registry.execute("intake", order, &context)?;
        println!("State: {}", response.state);
        println!("  Data: {:?}", response.data);
        for warning in &response.warnings {
            println!("  Warning from {}: {}", warning.processor, warning.message);
        }
        println!();
    }

    Ok(())
}
