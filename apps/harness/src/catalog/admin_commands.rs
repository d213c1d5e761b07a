//! Collection management, introspection and server administration commands.

use mongodb::bson::{Document, doc};

use crate::executor::{Case, Operation};
use crate::suite::{Fixture, SuiteDefinition};

use super::{admin, command, create_index, find};

pub const NAME: &str = "admin_commands";

const FIXTURE: &str = "admin_fixture";
const SCRATCH: &str = "my_coll";
const RENAMED: &str = "renamed_coll";

fn documents() -> Vec<Document> {
    (1..=5)
        .map(|i| doc! { "a": i, "name": format!("item-{}", i), "even": (i % 2 == 0) })
        .collect()
}

pub fn suite(database: &str) -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![
            Fixture::seeded(FIXTURE, documents()),
            Fixture::scratch(SCRATCH),
            Fixture::scratch(RENAMED),
        ],
        cases: vec![
            command("create collection", doc! { "create": SCRATCH }),
            command("listCollections", doc! { "listCollections": 1, "nameOnly": true }),
            command(
                "collMod validator",
                doc! {
                    "collMod": SCRATCH,
                    "validator": { "name": { "$type": "string" } },
                    "validationLevel": "moderate",
                },
            ),
            create_index("create index", FIXTURE, doc! { "a": 1 }, doc! {}),
            command("listIndexes", doc! { "listIndexes": FIXTURE }),
            command("reIndex", doc! { "reIndex": SCRATCH }),
            command("compact", doc! { "compact": FIXTURE }),
            command("validate", doc! { "validate": FIXTURE }),
            command("dbStats", doc! { "dbStats": 1 }),
            command("count", doc! { "count": FIXTURE, "query": { "even": true } }),
            command("distinct", doc! { "distinct": FIXTURE, "key": "a" }),
            command("buildInfo", doc! { "buildInfo": 1 }),
            command("serverStatus", doc! { "serverStatus": 1 }),
            command("hostInfo", doc! { "hostInfo": 1 }),
            command("connectionStatus", doc! { "connectionStatus": 1 }),
            admin("listDatabases", doc! { "listDatabases": 1, "nameOnly": true }),
            admin(
                "getParameter",
                doc! { "getParameter": 1, "featureCompatibilityVersion": 1 },
            ),
            admin("setParameter", doc! { "setParameter": 1, "logLevel": 0 }),
            admin("logRotate", doc! { "logRotate": 1 }),
            admin("fsync", doc! { "fsync": 1 }),
            admin("currentOp", doc! { "currentOp": 1, "active": true }),
            Case::new(
                "setUserWriteBlockMode",
                Operation::WithGlobalState {
                    apply: doc! { "setUserWriteBlockMode": 1, "global": true },
                    revert: doc! { "setUserWriteBlockMode": 1, "global": false },
                    inner: Box::new(Operation::Find {
                        collection: FIXTURE.to_string(),
                        filter: doc! { "a": 1 },
                    }),
                },
            ),
            find("find after write block", FIXTURE, doc! {}),
            admin(
                "renameCollection",
                doc! {
                    "renameCollection": format!("{}.{}", database, SCRATCH),
                    "to": format!("{}.{}", database, RENAMED),
                },
            ),
            command("drop collection", doc! { "drop": RENAMED }),
        ],
    }
}
