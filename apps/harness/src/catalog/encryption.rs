//! Server-side surface of client-side and queryable encryption.
//!
//! Only commands and schemas are exercised; no key management or
//! client-side cryptography is performed.

use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{Binary, Bson, doc};

use crate::suite::{Fixture, SuiteDefinition};

use super::{command, create_index, insert};

pub const NAME: &str = "encryption";

const KEY_VAULT: &str = "datakeys";
const QUERYABLE: &str = "enc_patients";
const SCHEMA: &str = "enc_records";

/// Fixed data key id so every run issues identical commands.
fn key_id() -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: vec![
            0x6f, 0x1c, 0x2a, 0x4e, 0x8d, 0x3b, 0x4c, 0x11, 0x9a, 0x5e, 0x0b, 0x7d, 0x21, 0x44,
            0xc3, 0x90,
        ],
    })
}

fn ciphertext() -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Encrypted,
        bytes: vec![0x01; 32],
    })
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![
            Fixture::scratch(KEY_VAULT),
            Fixture::scratch(QUERYABLE),
            Fixture::scratch(SCHEMA),
        ],
        cases: vec![
            command("create key vault", doc! { "create": KEY_VAULT }),
            create_index(
                "key vault keyAltNames index",
                KEY_VAULT,
                doc! { "keyAltNames": 1 },
                doc! {
                    "unique": true,
                    "partialFilterExpression": { "keyAltNames": { "$exists": true } },
                },
            ),
            insert(
                "insert data key document",
                KEY_VAULT,
                vec![doc! {
                    "_id": key_id(),
                    "keyAltNames": ["compat-key"],
                    "keyMaterial": ciphertext(),
                    "masterKey": { "provider": "local" },
                    "status": 0,
                }],
            ),
            command(
                "create collection with encryptedFields",
                doc! {
                    "create": QUERYABLE,
                    "encryptedFields": {
                        "fields": [{
                            "path": "ssn",
                            "bsonType": "string",
                            "keyId": key_id(),
                            "queries": { "queryType": "equality" },
                        }]
                    },
                },
            ),
            command(
                "listCollections shows encryptedFields",
                doc! { "listCollections": 1, "filter": { "name": QUERYABLE } },
            ),
            command(
                "create collection with encrypt schema",
                doc! {
                    "create": SCHEMA,
                    "validator": {
                        "$jsonSchema": {
                            "bsonType": "object",
                            "properties": {
                                "ssn": {
                                    "encrypt": {
                                        "bsonType": "string",
                                        "algorithm": "AEAD_AES_256_CBC_HMAC_SHA_512-Deterministic",
                                        "keyId": [key_id()],
                                    }
                                }
                            },
                        }
                    },
                },
            ),
            insert(
                "insert ciphertext into encrypt schema",
                SCHEMA,
                vec![doc! { "name": "patient", "ssn": ciphertext() }],
            ),
            command(
                "compactStructuredEncryptionData",
                doc! { "compactStructuredEncryptionData": QUERYABLE },
            ),
        ],
    }
}
