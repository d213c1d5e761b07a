//! Aggregation pipeline stages, one case per stage.

use mongodb::bson::{DateTime, Document, doc};

use crate::suite::{Fixture, SuiteDefinition};

use super::aggregate;

pub const NAME: &str = "aggregation_stages";

const SALES: &str = "sales";
const INVENTORY: &str = "inventory";
const OUT: &str = "sales_out";
const MERGED: &str = "sales_merged";

/// 2024-01-01T00:00:00Z
const BASE_MILLIS: i64 = 1_704_067_200_000;
const DAY_MILLIS: i64 = 86_400_000;

fn sales() -> Vec<Document> {
    let items = [
        ("abc", 10.0, 2, vec!["red", "blank"]),
        ("jkl", 20.0, 1, vec!["blank"]),
        ("xyz", 5.0, 10, vec!["red", "blue"]),
        ("xyz", 5.0, 20, vec!["blue"]),
        ("abc", 10.0, 10, vec!["red"]),
        ("def", 7.5, 5, Vec::new()),
    ];

    items
        .into_iter()
        .enumerate()
        .map(|(i, (item, price, quantity, tags))| {
            doc! {
                "_id": (i as i32 + 1),
                "item": item,
                "price": price,
                "quantity": quantity,
                "tags": tags,
                "date": DateTime::from_millis(BASE_MILLIS + i as i64 * DAY_MILLIS),
                "manager": (if i == 0 { None } else { Some(1_i32) }),
            }
        })
        .collect()
}

fn inventory() -> Vec<Document> {
    vec![
        doc! { "_id": 1, "sku": "abc", "instock": 120 },
        doc! { "_id": 2, "sku": "def", "instock": 80 },
        doc! { "_id": 3, "sku": "jkl", "instock": 60 },
        doc! { "_id": 4, "sku": "xyz", "instock": 0 },
    ]
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![
            Fixture::seeded(SALES, sales()),
            Fixture::seeded(INVENTORY, inventory()),
            Fixture::scratch(OUT),
            Fixture::scratch(MERGED),
        ],
        cases: vec![
            aggregate("$match", SALES, vec![doc! { "$match": { "item": "abc" } }]),
            aggregate(
                "$group",
                SALES,
                vec![doc! {
                    "$group": {
                        "_id": "$item",
                        "total": { "$sum": { "$multiply": ["$price", "$quantity"] } },
                        "count": { "$sum": 1 },
                    }
                }],
            ),
            aggregate(
                "$project",
                SALES,
                vec![doc! { "$project": { "item": 1, "quantity": 1, "_id": 0 } }],
            ),
            aggregate(
                "$sort",
                SALES,
                vec![doc! { "$sort": { "quantity": -1, "_id": 1 } }],
            ),
            aggregate("$limit", SALES, vec![doc! { "$limit": 2 }]),
            aggregate(
                "$skip",
                SALES,
                vec![doc! { "$sort": { "_id": 1 } }, doc! { "$skip": 4 }],
            ),
            aggregate("$unwind", SALES, vec![doc! { "$unwind": "$tags" }]),
            aggregate(
                "$lookup",
                SALES,
                vec![doc! {
                    "$lookup": {
                        "from": INVENTORY,
                        "localField": "item",
                        "foreignField": "sku",
                        "as": "stock",
                    }
                }],
            ),
            aggregate(
                "$graphLookup",
                SALES,
                vec![doc! {
                    "$graphLookup": {
                        "from": SALES,
                        "startWith": "$manager",
                        "connectFromField": "manager",
                        "connectToField": "_id",
                        "as": "chain",
                        "maxDepth": 2,
                    }
                }],
            ),
            aggregate(
                "$addFields",
                SALES,
                vec![doc! { "$addFields": { "total": { "$multiply": ["$price", "$quantity"] } } }],
            ),
            aggregate(
                "$set",
                SALES,
                vec![doc! { "$set": { "discounted": { "$multiply": ["$price", 0.9] } } }],
            ),
            aggregate("$unset", SALES, vec![doc! { "$unset": ["tags", "date"] }]),
            aggregate(
                "$count",
                SALES,
                vec![doc! { "$match": { "quantity": { "$gte": 5 } } }, doc! { "$count": "n" }],
            ),
            aggregate(
                "$facet",
                SALES,
                vec![doc! {
                    "$facet": {
                        "by_item": [{ "$sortByCount": "$item" }],
                        "expensive": [{ "$match": { "price": { "$gte": 10.0 } } }, { "$count": "n" }],
                    }
                }],
            ),
            aggregate(
                "$bucket",
                SALES,
                vec![doc! {
                    "$bucket": {
                        "groupBy": "$price",
                        "boundaries": [0, 10, 20, 30],
                        "default": "other",
                        "output": { "count": { "$sum": 1 } },
                    }
                }],
            ),
            aggregate(
                "$bucketAuto",
                SALES,
                vec![doc! { "$bucketAuto": { "groupBy": "$quantity", "buckets": 3 } }],
            ),
            aggregate("$sortByCount", SALES, vec![doc! { "$sortByCount": "$item" }]),
            aggregate(
                "$replaceRoot",
                SALES,
                vec![doc! { "$replaceRoot": { "newRoot": { "item": "$item", "qty": "$quantity" } } }],
            ),
            aggregate("$sample", SALES, vec![doc! { "$sample": { "size": 2 } }]),
            aggregate(
                "$redact",
                SALES,
                vec![doc! {
                    "$redact": {
                        "$cond": {
                            "if": { "$gt": ["$quantity", 5] },
                            "then": "$$KEEP",
                            "else": "$$PRUNE",
                        }
                    }
                }],
            ),
            aggregate(
                "$unionWith",
                SALES,
                vec![doc! { "$unionWith": { "coll": INVENTORY, "pipeline": [{ "$project": { "sku": 1 } }] } }],
            ),
            aggregate(
                "$setWindowFields",
                SALES,
                vec![doc! {
                    "$setWindowFields": {
                        "partitionBy": "$item",
                        "sortBy": { "date": 1 },
                        "output": {
                            "running_quantity": {
                                "$sum": "$quantity",
                                "window": { "documents": ["unbounded", "current"] },
                            }
                        },
                    }
                }],
            ),
            aggregate(
                "$densify",
                SALES,
                vec![doc! {
                    "$densify": {
                        "field": "date",
                        "range": { "step": 12, "unit": "hour", "bounds": "full" },
                    }
                }],
            ),
            aggregate(
                "$fill",
                SALES,
                vec![doc! {
                    "$fill": {
                        "sortBy": { "date": 1 },
                        "output": { "manager": { "value": 0 } },
                    }
                }],
            ),
            aggregate("$out", SALES, vec![doc! { "$match": { "item": "xyz" } }, doc! { "$out": OUT }]),
            aggregate(
                "$merge",
                SALES,
                vec![
                    doc! { "$group": { "_id": "$item", "quantity": { "$sum": "$quantity" } } },
                    doc! { "$merge": { "into": MERGED, "whenMatched": "replace", "whenNotMatched": "insert" } },
                ],
            ),
        ],
    }
}
