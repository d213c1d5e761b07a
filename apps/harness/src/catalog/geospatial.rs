//! Geospatial indexes, query operators and the `$geoNear` stage.

use mongodb::bson::{Document, doc};

use crate::suite::{Fixture, SuiteDefinition};

use super::{aggregate, create_index, find};

pub const NAME: &str = "geospatial";

const PLACES: &str = "places";

fn places() -> Vec<Document> {
    let points = [
        ("Central Park", -73.9654, 40.7829, "park"),
        ("Times Square", -73.9855, 40.7580, "landmark"),
        ("Brooklyn Bridge", -73.9969, 40.7061, "landmark"),
        ("Prospect Park", -73.9690, 40.6602, "park"),
        ("Statue of Liberty", -74.0445, 40.6892, "landmark"),
    ];

    points
        .iter()
        .map(|(name, lng, lat, category)| {
            doc! {
                "name": *name,
                "category": *category,
                "location": { "type": "Point", "coordinates": [*lng, *lat] },
                "legacy": [*lng, *lat],
            }
        })
        .collect()
}

fn midtown_polygon() -> Document {
    doc! {
        "type": "Polygon",
        "coordinates": [[
            [-74.00, 40.75],
            [-73.95, 40.75],
            [-73.95, 40.80],
            [-74.00, 40.80],
            [-74.00, 40.75],
        ]],
    }
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::seeded(PLACES, places())],
        cases: vec![
            create_index("2dsphere index", PLACES, doc! { "location": "2dsphere" }, doc! {}),
            create_index("2d index", PLACES, doc! { "legacy": "2d" }, doc! {}),
            find(
                "$geoWithin $geometry",
                PLACES,
                doc! { "location": { "$geoWithin": { "$geometry": midtown_polygon() } } },
            ),
            find(
                "$geoWithin $centerSphere",
                PLACES,
                doc! {
                    "location": {
                        "$geoWithin": { "$centerSphere": [[-73.98, 40.75], 5.0 / 3963.2] }
                    }
                },
            ),
            find(
                "$geoIntersects",
                PLACES,
                doc! { "location": { "$geoIntersects": { "$geometry": midtown_polygon() } } },
            ),
            find(
                "$near",
                PLACES,
                doc! {
                    "location": {
                        "$near": {
                            "$geometry": { "type": "Point", "coordinates": [-73.98, 40.76] },
                            "$maxDistance": 5000,
                        }
                    }
                },
            ),
            find(
                "$nearSphere",
                PLACES,
                doc! {
                    "location": {
                        "$nearSphere": {
                            "$geometry": { "type": "Point", "coordinates": [-73.98, 40.76] },
                            "$minDistance": 100,
                        }
                    }
                },
            ),
            find(
                "$geoWithin $box legacy",
                PLACES,
                doc! { "legacy": { "$geoWithin": { "$box": [[-74.05, 40.65], [-73.95, 40.80]] } } },
            ),
            aggregate(
                "$geoNear",
                PLACES,
                vec![doc! {
                    "$geoNear": {
                        "near": { "type": "Point", "coordinates": [-73.98, 40.76] },
                        "distanceField": "distance",
                        "key": "location",
                        "query": { "category": "park" },
                        "spherical": true,
                    }
                }],
            ),
        ],
    }
}
