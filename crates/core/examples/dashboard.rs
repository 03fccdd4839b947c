//! Dashboard: load independent widgets concurrently, keyed by name.
//!
//! Run with: RUST_LOG=trace cargo run --example dashboard
//!
//! This example demonstrates:
//! - `all_of` for a page that needs every widget
//! - `all_settled_of` for a page that renders whatever loaded
//! - A `LoggingHook` reporting through `env_logger`
//! - Struct-shaped aggregation with `all_of_struct!`

use std::time::Duration;

use indexmap::IndexMap;
use keyed_join_core::{
    all_of_struct, AggregateConfig, Aggregator, Computation, LoggingHook, Outcome,
};

/// A widget loader that takes `delay_ms` and may fail.
fn widget(name: &'static str, delay_ms: u64, fail: bool) -> Computation<String, String> {
    Computation::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        if fail {
            Err(format!("{name}: upstream timed out"))
        } else {
            Ok(format!("<{name}>"))
        }
    })
}

fn widgets(weather_fails: bool) -> IndexMap<&'static str, Computation<String, String>> {
    let mut input = IndexMap::new();
    input.insert("news", widget("news", 40, false));
    input.insert("weather", widget("weather", 10, weather_fails));
    input.insert("stocks", widget("stocks", 25, false));
    input
}

struct Header {
    user: String,
    unread: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let aggregator =
        Aggregator::new(AggregateConfig::default()).with_hook(LoggingHook::verbose());

    println!("=== all_of: every widget loads ===\n");
    match aggregator.all_of(widgets(false)).await {
        Ok(page) => {
            for (name, html) in &page {
                println!("  {name:8} {html}");
            }
        }
        Err(err) => println!("  page failed: {err}"),
    }

    println!("\n=== all_of: weather fails first ===\n");
    match aggregator.all_of(widgets(true)).await {
        Ok(_) => println!("  unexpected success"),
        Err(err) => println!("  page failed: {err}"),
    }

    println!("\n=== all_settled_of: render what loaded ===\n");
    match aggregator.all_settled_of(widgets(true)).await {
        Ok(page) => {
            for (name, outcome) in &page {
                match outcome {
                    Outcome::Fulfilled { value } => println!("  {name:8} {value}"),
                    Outcome::Rejected { reason } => println!("  {name:8} (placeholder: {reason})"),
                }
            }
        }
        Err(err) => println!("  bad input: {err}"),
    }

    println!("\n=== all_of_struct!: differently typed fields ===\n");
    let header = all_of_struct!(Header {
        user: Computation::<_, String>::resolved("ada".to_string()),
        unread: async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(3)
        },
    })
    .await;

    match header {
        Ok(Header { user, unread }) => println!("  {user} has {unread} unread"),
        Err(err) => println!("  header failed: {err}"),
    }
}
