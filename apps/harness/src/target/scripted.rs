//! Scripted target double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{Document, doc};

use super::{Target, TargetError};

#[derive(Default)]
struct Script {
    commands: HashMap<String, VecDeque<Result<Document, TargetError>>>,
    aggregates: VecDeque<Result<Vec<Document>, TargetError>>,
    finds: VecDeque<Result<Vec<Document>, TargetError>>,
    insert_failures: VecDeque<TargetError>,
    fail_drops: bool,
    version: Option<String>,
    calls: Vec<String>,
}

/// Target that answers from queued responses and records every call.
///
/// Unscripted commands answer `{ok: 1.0}`, unscripted queries answer an
/// empty result set, and inserts succeed.
pub(crate) struct ScriptedTarget {
    script: Mutex<Script>,
}

impl ScriptedTarget {
    pub(crate) fn new() -> Self {
        ScriptedTarget {
            script: Mutex::new(Script {
                version: Some("7.0.0".to_string()),
                ..Script::default()
            }),
        }
    }

    /// Queue a result for the next command (on any database) whose first key is `name`.
    pub(crate) fn respond_command(&self, name: &str, result: Result<Document, TargetError>) {
        self.script
            .lock()
            .unwrap()
            .commands
            .entry(name.to_string())
            .or_default()
            .push_back(result);
    }

    pub(crate) fn respond_aggregate(&self, result: Result<Vec<Document>, TargetError>) {
        self.script.lock().unwrap().aggregates.push_back(result);
    }

    pub(crate) fn respond_find(&self, result: Result<Vec<Document>, TargetError>) {
        self.script.lock().unwrap().finds.push_back(result);
    }

    pub(crate) fn fail_next_insert(&self, error: TargetError) {
        self.script.lock().unwrap().insert_failures.push_back(error);
    }

    pub(crate) fn fail_drops(&self) {
        self.script.lock().unwrap().fail_drops = true;
    }

    pub(crate) fn without_version(&self) {
        self.script.lock().unwrap().version = None;
    }

    /// Calls made so far, as `"<method>:<detail>"` strings; admin commands are `admin:<name>`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.script.lock().unwrap().calls.push(call);
    }

    fn answer_command(&self, kind: &str, command: &Document) -> Result<Document, TargetError> {
        let name = command.keys().next().cloned().unwrap_or_default();
        self.record(format!("{}:{}", kind, name));

        let mut script = self.script.lock().unwrap();
        match script.commands.get_mut(&name).and_then(VecDeque::pop_front) {
            Some(result) => result,
            None => Ok(doc! { "ok": 1.0 }),
        }
    }
}

#[async_trait]
impl Target for ScriptedTarget {
    async fn run_command(&self, command: Document) -> Result<Document, TargetError> {
        self.answer_command("command", &command)
    }

    async fn run_admin_command(&self, command: Document) -> Result<Document, TargetError> {
        self.answer_command("admin", &command)
    }

    async fn aggregate(
        &self,
        collection: &str,
        _pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, TargetError> {
        self.record(format!("aggregate:{}", collection));
        self.script
            .lock()
            .unwrap()
            .aggregates
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Document, TargetError> {
        self.record(format!("insert:{}", collection));
        if let Some(error) = self.script.lock().unwrap().insert_failures.pop_front() {
            return Err(error);
        }
        Ok(doc! { "acknowledged": true, "inserted_count": documents.len() as i64 })
    }

    async fn find(&self, collection: &str, _filter: Document) -> Result<Vec<Document>, TargetError> {
        self.record(format!("find:{}", collection));
        self.script
            .lock()
            .unwrap()
            .finds
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn update_many(
        &self,
        collection: &str,
        _filter: Document,
        _update: Document,
    ) -> Result<Document, TargetError> {
        self.record(format!("update:{}", collection));
        Ok(doc! { "acknowledged": true, "matched_count": 0_i64, "modified_count": 0_i64 })
    }

    async fn delete_many(
        &self,
        collection: &str,
        _filter: Document,
    ) -> Result<Document, TargetError> {
        self.record(format!("delete:{}", collection));
        Ok(doc! { "acknowledged": true, "deleted_count": 0_i64 })
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), TargetError> {
        self.record(format!("drop:{}", collection));
        if self.script.lock().unwrap().fail_drops {
            return Err(TargetError::new("drop refused"));
        }
        Ok(())
    }

    async fn server_version(&self) -> Result<String, TargetError> {
        self.script
            .lock()
            .unwrap()
            .version
            .clone()
            .ok_or_else(|| TargetError::new("buildInfo unavailable"))
    }
}
