//! Time-series collections.

use mongodb::bson::{DateTime, Document, doc};

use crate::executor::{Case, Operation};
use crate::suite::{Fixture, SuiteDefinition};

use super::{aggregate, command, create_index, find, insert};

pub const NAME: &str = "timeseries";

const WEATHER: &str = "weather";

/// 2024-03-01T00:00:00Z
const BASE_MILLIS: i64 = 1_709_251_200_000;
const HOUR_MILLIS: i64 = 3_600_000;

fn measurements() -> Vec<Document> {
    (0..12)
        .map(|i: i64| {
            let sensor = if i % 2 == 0 { "north" } else { "south" };
            doc! {
                "timestamp": DateTime::from_millis(BASE_MILLIS + i * HOUR_MILLIS),
                "sensor": { "id": sensor, "kind": "thermometer" },
                "temperature": 12.0 + (i as f64) * 0.5,
            }
        })
        .collect()
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::scratch(WEATHER)],
        cases: vec![
            command(
                "create time-series collection",
                doc! {
                    "create": WEATHER,
                    "timeseries": {
                        "timeField": "timestamp",
                        "metaField": "sensor",
                        "granularity": "hours",
                    },
                },
            ),
            insert("insert measurements", WEATHER, measurements()),
            find("query by metaField", WEATHER, doc! { "sensor.id": "north" }),
            find(
                "query by time range",
                WEATHER,
                doc! {
                    "timestamp": {
                        "$gte": DateTime::from_millis(BASE_MILLIS),
                        "$lt": DateTime::from_millis(BASE_MILLIS + 6 * HOUR_MILLIS),
                    }
                },
            ),
            aggregate(
                "average per sensor",
                WEATHER,
                vec![doc! {
                    "$group": { "_id": "$sensor.id", "avg": { "$avg": "$temperature" } }
                }],
            ),
            aggregate(
                "$setWindowFields moving average",
                WEATHER,
                vec![doc! {
                    "$setWindowFields": {
                        "partitionBy": "$sensor.id",
                        "sortBy": { "timestamp": 1 },
                        "output": {
                            "moving_avg": {
                                "$avg": "$temperature",
                                "window": { "documents": [-2, 0] },
                            }
                        },
                    }
                }],
            ),
            create_index(
                "secondary index",
                WEATHER,
                doc! { "sensor.id": 1, "timestamp": -1 },
                doc! {},
            ),
            command(
                "collMod expireAfterSeconds",
                doc! { "collMod": WEATHER, "expireAfterSeconds": 86_400 },
            ),
            Case::new(
                "update by metaField",
                Operation::Update {
                    collection: WEATHER.to_string(),
                    filter: doc! { "sensor.id": "south" },
                    update: doc! { "$set": { "sensor.kind": "hygrometer" } },
                },
            ),
            Case::new(
                "delete by metaField",
                Operation::Delete {
                    collection: WEATHER.to_string(),
                    filter: doc! { "sensor.id": "north" },
                },
            ),
        ],
    }
}
