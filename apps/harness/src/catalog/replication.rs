//! Replica set introspection, read and write concerns, change streams.

use mongodb::bson::{Document, doc};

use crate::suite::{Fixture, SuiteDefinition};

use super::{admin, command};

pub const NAME: &str = "replication";

const FIXTURE: &str = "repl_fixture";

fn documents() -> Vec<Document> {
    (1..=4).map(|i| doc! { "seq": i, "payload": format!("p{}", i) }).collect()
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::seeded(FIXTURE, documents())],
        cases: vec![
            command("hello", doc! { "hello": 1 }),
            command("isMaster", doc! { "isMaster": 1 }),
            admin("replSetGetStatus", doc! { "replSetGetStatus": 1 }),
            admin("replSetGetConfig", doc! { "replSetGetConfig": 1 }),
            admin("getDefaultRWConcern", doc! { "getDefaultRWConcern": 1 }),
            command(
                "insert with majority write concern",
                doc! {
                    "insert": FIXTURE,
                    "documents": [{ "seq": 5, "payload": "p5" }],
                    "writeConcern": { "w": "majority", "wtimeout": 5000 },
                },
            ),
            command(
                "find with majority read concern",
                doc! { "find": FIXTURE, "filter": {}, "readConcern": { "level": "majority" } },
            ),
            command(
                "find with linearizable read concern",
                doc! {
                    "find": FIXTURE,
                    "filter": { "seq": 1 },
                    "readConcern": { "level": "linearizable" },
                },
            ),
            command(
                "find with secondaryPreferred read preference",
                doc! {
                    "find": FIXTURE,
                    "filter": {},
                    "$readPreference": { "mode": "secondaryPreferred" },
                },
            ),
            command(
                "open change stream",
                doc! {
                    "aggregate": FIXTURE,
                    "pipeline": [{ "$changeStream": {} }],
                    "cursor": {},
                },
            ),
            admin("replSetStepDown", doc! { "replSetStepDown": 60, "force": false }),
        ],
    }
}
