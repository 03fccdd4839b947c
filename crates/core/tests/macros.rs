//! # Struct Aggregation Tests
//!
//! Fields of different types awaited together through `all_of_struct!` and
//! `all_settled_of_struct!`.

use std::time::Duration;

use keyed_join_core::{all_of_struct, all_settled_of_struct, Computation, Outcome};
use tokio::time::sleep;

fn after<T: Send + 'static>(ms: u64, result: Result<T, String>) -> Computation<T, String> {
    Computation::deferred(async move {
        sleep(Duration::from_millis(ms)).await;
        result
    })
}

#[derive(Debug, PartialEq)]
struct Account {
    name: String,
    balance: i64,
    active: bool,
}

#[derive(Debug)]
struct AccountReport {
    name: Outcome<String, String>,
    balance: Outcome<i64, String>,
    active: Outcome<bool, String>,
}

#[tokio::test(start_paused = true)]
async fn test_all_of_struct_collects_every_field() {
    let account = all_of_struct!(Account {
        name: after(30, Ok("ada".to_string())),
        balance: after(10, Ok(120)),
        active: Computation::resolved(true),
    })
    .await;

    assert_eq!(
        account,
        Ok(Account {
            name: "ada".to_string(),
            balance: 120,
            active: true,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_all_of_struct_fails_with_first_failure_in_time() {
    let account = all_of_struct!(Account {
        name: after(50, Err("name lookup failed".to_string())),
        balance: after(10, Err("ledger offline".to_string())),
        active: after(30, Ok(true)),
    })
    .await;

    assert_eq!(account, Err("ledger offline".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_all_settled_of_struct_reports_mixed_outcomes() {
    let report = all_settled_of_struct!(AccountReport {
        name: after(20, Ok("ada".to_string())),
        balance: after(10, Err("ledger offline".to_string())),
        active: Computation::resolved(false),
    })
    .await;

    assert_eq!(
        report.name,
        Outcome::Fulfilled {
            value: "ada".to_string()
        }
    );
    assert_eq!(
        report.balance,
        Outcome::Rejected {
            reason: "ledger offline".to_string()
        }
    );
    assert_eq!(report.active, Outcome::Fulfilled { value: false });
}
