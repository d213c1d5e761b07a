//! Index kinds and options, plus query plans that must use them.

use mongodb::bson::{Document, doc};

use crate::executor::{Case, Operation};
use crate::suite::{Fixture, SuiteDefinition};

use super::{command, create_index};

pub const NAME: &str = "index_types";

const FIXTURE: &str = "index_fixture";

fn documents() -> Vec<Document> {
    let descriptions = [
        "fresh coffee beans from the highlands",
        "green tea leaves",
        "dark roast coffee",
        "herbal infusion with mint",
    ];

    descriptions
        .iter()
        .enumerate()
        .map(|(i, description)| {
            let i = i as i32;
            doc! {
                "sku": format!("sku-{}", i),
                "qty": i * 10,
                "price": 2.5 * f64::from(i + 1),
                "tags": ["drink", (if i % 2 == 0 { "hot" } else { "cold" })],
                "description": *description,
                "category": { "name": (if i < 2 { "beverage" } else { "grocery" }), "level": i },
                "location": { "type": "Point", "coordinates": [-73.97 + f64::from(i) * 0.01, 40.77] },
                "grid": [f64::from(i), f64::from(i) * 2.0],
                "nickname": (if i == 3 { None } else { Some(format!("n{}", i)) }),
            }
        })
        .collect()
}

fn indexed_query(name: &str, keys: Document, index_name: &str, filter: Document) -> Case {
    Case::new(
        name,
        Operation::IndexedQuery {
            collection: FIXTURE.to_string(),
            keys,
            options: doc! {},
            index_name: index_name.to_string(),
            filter,
        },
    )
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::seeded(FIXTURE, documents())],
        cases: vec![
            create_index("single field index", FIXTURE, doc! { "sku": 1 }, doc! {}),
            create_index(
                "compound index",
                FIXTURE,
                doc! { "category.name": 1, "price": -1 },
                doc! {},
            ),
            create_index("multikey index", FIXTURE, doc! { "tags": 1 }, doc! {}),
            create_index("2dsphere index", FIXTURE, doc! { "location": "2dsphere" }, doc! {}),
            create_index("2d index", FIXTURE, doc! { "grid": "2d" }, doc! {}),
            create_index("hashed index", FIXTURE, doc! { "sku": "hashed" }, doc! {}),
            create_index("wildcard index", FIXTURE, doc! { "category.$**": 1 }, doc! {}),
            create_index(
                "partial index",
                FIXTURE,
                doc! { "price": 1 },
                doc! { "partialFilterExpression": { "qty": { "$gt": 5 } } },
            ),
            create_index(
                "sparse index",
                FIXTURE,
                doc! { "nickname": 1 },
                doc! { "sparse": true },
            ),
            create_index(
                "unique index",
                FIXTURE,
                doc! { "sku": 1, "qty": 1 },
                doc! { "unique": true },
            ),
            create_index(
                "ttl index",
                FIXTURE,
                doc! { "created_at": 1 },
                doc! { "expireAfterSeconds": 3600 },
            ),
            create_index(
                "case insensitive index",
                FIXTURE,
                doc! { "category.name": 1 },
                doc! {
                    "name": "category_ci",
                    "collation": { "locale": "en", "strength": 2 },
                },
            ),
            create_index(
                "hidden index",
                FIXTURE,
                doc! { "qty": -1 },
                doc! { "hidden": true },
            ),
            command("listIndexes", doc! { "listIndexes": FIXTURE }),
            indexed_query(
                "single field index used in plan",
                doc! { "qty": 1 },
                "qty_1",
                doc! { "qty": { "$gte": 10 } },
            ),
            indexed_query(
                "text index used in plan",
                doc! { "description": "text" },
                "description_text",
                doc! { "$text": { "$search": "coffee" } },
            ),
            command(
                "dropIndexes",
                doc! { "dropIndexes": FIXTURE, "index": "category_ci" },
            ),
        ],
    }
}
