//! Legacy `$text` search and hosted full-text search indexes.

use mongodb::bson::{Document, doc};

use crate::executor::{Case, Operation};
use crate::suite::{Fixture, SuiteDefinition};

use super::{aggregate, command, create_index, find};

pub const NAME: &str = "text_search";

const ARTICLES: &str = "articles";
const SEARCH_INDEX: &str = "articles_search";

fn articles() -> Vec<Document> {
    vec![
        doc! { "_id": 1, "title": "Coffee shops of the north", "body": "A guide to espresso and filter coffee", "lang": "english" },
        doc! { "_id": 2, "title": "Brewing tea", "body": "Green, black and oolong tea brewing times", "lang": "english" },
        doc! { "_id": 3, "title": "Cafe culture", "body": "Why coffee houses shaped city life", "lang": "english" },
        doc! { "_id": 4, "title": "Cafe con leche", "body": "Recetas de cafe con leche", "lang": "spanish" },
        doc! { "_id": 5, "title": "Bakery notes", "body": "Sourdough starters and COFFEE cake", "lang": "english" },
    ]
}

pub fn suite() -> SuiteDefinition {
    SuiteDefinition {
        name: NAME.to_string(),
        fixtures: vec![Fixture::seeded(ARTICLES, articles())],
        cases: vec![
            create_index(
                "text index",
                ARTICLES,
                doc! { "title": "text", "body": "text" },
                doc! {
                    "name": "article_text",
                    "weights": { "title": 10, "body": 1 },
                    "language_override": "lang",
                },
            ),
            find("$text search", ARTICLES, doc! { "$text": { "$search": "coffee" } }),
            find(
                "$text phrase",
                ARTICLES,
                doc! { "$text": { "$search": "\"filter coffee\"" } },
            ),
            find(
                "$text negation",
                ARTICLES,
                doc! { "$text": { "$search": "coffee -cake" } },
            ),
            find(
                "$text case sensitive",
                ARTICLES,
                doc! { "$text": { "$search": "COFFEE", "$caseSensitive": true } },
            ),
            find(
                "$text language",
                ARTICLES,
                doc! { "$text": { "$search": "leche", "$language": "spanish" } },
            ),
            aggregate(
                "$text with textScore sort",
                ARTICLES,
                vec![
                    doc! { "$match": { "$text": { "$search": "coffee tea" } } },
                    doc! { "$project": { "title": 1, "score": { "$meta": "textScore" } } },
                    doc! { "$sort": { "score": { "$meta": "textScore" } } },
                ],
            ),
            Case::new(
                "search index query",
                Operation::SearchQuery {
                    collection: ARTICLES.to_string(),
                    index_name: SEARCH_INDEX.to_string(),
                    definition: doc! { "mappings": { "dynamic": true } },
                    pipeline: vec![
                        doc! {
                            "$search": {
                                "index": SEARCH_INDEX,
                                "text": { "query": "coffee", "path": ["title", "body"] },
                            }
                        },
                        doc! { "$limit": 5 },
                    ],
                },
            ),
            aggregate(
                "$searchMeta count",
                ARTICLES,
                vec![doc! {
                    "$searchMeta": {
                        "index": SEARCH_INDEX,
                        "text": { "query": "coffee", "path": "body" },
                        "count": { "type": "total" },
                    }
                }],
            ),
            command(
                "dropSearchIndex",
                doc! { "dropSearchIndex": ARTICLES, "name": SEARCH_INDEX },
            ),
        ],
    }
}
