//! Logical sessions and retryable writes.

use mongodb::bson::{Document, doc};

use crate::executor::{Case, Operation};
use crate::suite::{Fixture, SuiteDefinition};

use super::{admin, command};

pub const NAME: &str = "sessions";

const ORDERS: &str = "session_orders";

/// Attempts allowed for writes the server may label retryable.
const WRITE_ATTEMPTS: u32 = 3;

fn orders() -> Vec<Document> {
    (1..=3)
        .map(|i| doc! { "order": i, "state": "open", "amount": i * 100 })
        .collect()
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::seeded(ORDERS, orders())],
        cases: vec![
            command("startSession", doc! { "startSession": 1 }),
            command("refreshSessions", doc! { "refreshSessions": [] }),
            command("endSessions", doc! { "endSessions": [] }),
            command("killSessions", doc! { "killSessions": [] }),
            admin("killAllSessions", doc! { "killAllSessions": [] }),
            Case::new(
                "retryable insert",
                Operation::Insert {
                    collection: ORDERS.to_string(),
                    documents: vec![doc! { "order": 4, "state": "open", "amount": 400 }],
                },
            )
            .with_retries(WRITE_ATTEMPTS),
            Case::new(
                "retryable update",
                Operation::Update {
                    collection: ORDERS.to_string(),
                    filter: doc! { "state": "open", "amount": { "$lt": 200 } },
                    update: doc! { "$set": { "state": "closed" } },
                },
            )
            .with_retries(WRITE_ATTEMPTS),
            Case::new(
                "retryable delete",
                Operation::Delete {
                    collection: ORDERS.to_string(),
                    filter: doc! { "state": "closed" },
                },
            )
            .with_retries(WRITE_ATTEMPTS),
            command(
                "find with local read concern",
                doc! { "find": ORDERS, "filter": {}, "readConcern": { "level": "local" } },
            ),
        ],
    }
}
