//! Round-trips of every BSON type through insert and `$type` queries.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{Binary, Bson, DateTime, Decimal128, Regex, Timestamp, doc};

use crate::executor::Case;
use crate::suite::{Fixture, SuiteDefinition};

use super::{find, insert};

pub const NAME: &str = "data_types";

const FIXTURE: &str = "types_fixture";

/// `(type alias used by $type, sample value)` for every BSON type a document may hold.
fn samples() -> Vec<(&'static str, Bson)> {
    vec![
        ("double", Bson::Double(3.25)),
        ("string", Bson::String("compat".to_string())),
        ("object", Bson::Document(doc! { "nested": true })),
        ("array", Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)])),
        (
            "binData",
            Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes: vec![0xde, 0xad, 0xbe, 0xef],
            }),
        ),
        (
            "objectId",
            Bson::ObjectId(ObjectId::from_bytes([
                0x65, 0x92, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            ])),
        ),
        ("bool", Bson::Boolean(true)),
        ("date", Bson::DateTime(DateTime::from_millis(1_704_067_200_000))),
        ("null", Bson::Null),
        (
            "regex",
            Bson::RegularExpression(Regex {
                pattern: "^compat".to_string(),
                options: "i".to_string(),
            }),
        ),
        (
            "javascript",
            Bson::JavaScriptCode("function() { return 1; }".to_string()),
        ),
        ("int", Bson::Int32(42)),
        (
            "timestamp",
            Bson::Timestamp(Timestamp {
                time: 1_704_067_200,
                increment: 1,
            }),
        ),
        ("long", Bson::Int64(9_007_199_254_740_993)),
        ("decimal", Bson::Decimal128(Decimal128::from_bytes([0; 16]))),
        ("minKey", Bson::MinKey),
        ("maxKey", Bson::MaxKey),
    ]
}

pub fn suite() -> SuiteDefinition {
    let mut cases: Vec<Case> = Vec::new();

    for (alias, value) in samples() {
        cases.push(insert(
            &format!("insert {}", alias),
            FIXTURE,
            vec![doc! { "kind": alias, "value": value }],
        ));
        cases.push(find(
            &format!("query {} by $type", alias),
            FIXTURE,
            doc! { "value": { "$type": alias } },
        ));
    }

    cases.push(find(
        "query numbers by $type alias",
        FIXTURE,
        doc! { "value": { "$type": "number" } },
    ));

    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::scratch(FIXTURE)],
        cases,
    }
}
