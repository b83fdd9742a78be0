//! Shared test support: an in-memory collection executor.
//!
//! `MockCollection` evaluates just enough of the compiled stage set to
//! exercise the orchestrator: equality matching, comparison operators,
//! skip/limit, and count. Anything else is rejected the way a live store
//! rejects an operator it does not know, which doubles as the runtime
//! failure trigger in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use stagecraft_core::{
    CollectionExecutor, Document, ExecutorResult, Pipeline, RuntimeError,
};

/// Route test logs through the capture-aware writer. Safe to call from
/// every test; only the first call installs the subscriber.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Clone, Default)]
pub struct MockCollection {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    collections: HashMap<String, Vec<Document>>,
    delay: Option<Duration>,
    simulate_connection_error: Option<String>,
    preview_calls: usize,
    count_calls: usize,
}

impl MockCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs(self, collection: &str, docs: Vec<Value>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let docs = docs
                .into_iter()
                .map(|v| match v {
                    Value::Object(map) => map,
                    other => panic!("mock documents must be objects, got {other}"),
                })
                .collect();
            state.collections.insert(collection.to_string(), docs);
        }
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub fn simulate_connection_error(&self, message: &str) {
        self.state.lock().unwrap().simulate_connection_error = Some(message.to_string());
    }

    #[allow(dead_code)]
    pub fn preview_calls(&self) -> usize {
        self.state.lock().unwrap().preview_calls
    }

    #[allow(dead_code)]
    pub fn count_calls(&self) -> usize {
        self.state.lock().unwrap().count_calls
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.preview_calls + state.count_calls
    }

    async fn evaluate(&self, prefix: &Pipeline, collection: &str) -> ExecutorResult<Vec<Document>> {
        let (delay, connection_error, mut docs) = {
            let state = self.state.lock().unwrap();
            (
                state.delay,
                state.simulate_connection_error.clone(),
                state
                    .collections
                    .get(collection)
                    .cloned()
                    .unwrap_or_default(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = connection_error {
            return Err(RuntimeError::Connection(message));
        }

        for stage in &prefix.stages {
            docs = apply_stage(&stage.operator, &stage.body, docs)?;
        }
        Ok(docs)
    }
}

fn apply_stage(
    operator: &str,
    body: &Value,
    docs: Vec<Document>,
) -> ExecutorResult<Vec<Document>> {
    match operator {
        "$match" => {
            let conditions = body
                .as_object()
                .ok_or_else(|| RuntimeError::Rejected("$match body must be a document".into()))?;
            let mut kept = Vec::new();
            for doc in docs {
                if matches_all(&doc, conditions)? {
                    kept.push(doc);
                }
            }
            Ok(kept)
        }
        "$limit" => {
            let n = body
                .as_u64()
                .ok_or_else(|| RuntimeError::Rejected("$limit expects an integer".into()))?;
            Ok(docs.into_iter().take(n as usize).collect())
        }
        "$skip" => {
            let n = body
                .as_u64()
                .ok_or_else(|| RuntimeError::Rejected("$skip expects an integer".into()))?;
            Ok(docs.into_iter().skip(n as usize).collect())
        }
        "$count" => {
            let field = body
                .as_str()
                .ok_or_else(|| RuntimeError::Rejected("$count expects a field name".into()))?;
            let mut doc = Document::new();
            doc.insert(field.to_string(), Value::from(docs.len() as u64));
            Ok(vec![doc])
        }
        other => Err(RuntimeError::Rejected(format!("unknown operator {other}"))),
    }
}

fn matches_all(
    doc: &Document,
    conditions: &serde_json::Map<String, Value>,
) -> ExecutorResult<bool> {
    for (field, expected) in conditions {
        let actual = doc.get(field).unwrap_or(&Value::Null);
        if !matches_condition(actual, expected)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_condition(actual: &Value, expected: &Value) -> ExecutorResult<bool> {
    let Some(wrapped) = expected.as_object() else {
        return Ok(actual == expected);
    };
    let Some((token, operand)) = wrapped.iter().next() else {
        return Ok(actual == expected);
    };

    match token.as_str() {
        "$ne" => Ok(actual != operand),
        "$in" => Ok(operand
            .as_array()
            .is_some_and(|items| items.contains(actual))),
        "$exists" => {
            let wants = operand.as_bool().unwrap_or(true);
            Ok((actual != &Value::Null) == wants)
        }
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let (Some(a), Some(b)) = (actual.as_f64(), operand.as_f64()) else {
                return Ok(false);
            };
            Ok(match token.as_str() {
                "$gt" => a > b,
                "$gte" => a >= b,
                "$lt" => a < b,
                _ => a <= b,
            })
        }
        other => Err(RuntimeError::Rejected(format!(
            "unknown match operator {other}"
        ))),
    }
}

#[async_trait]
impl CollectionExecutor for MockCollection {
    async fn preview(
        &self,
        prefix: &Pipeline,
        collection: &str,
        limit: usize,
    ) -> ExecutorResult<Vec<Document>> {
        self.state.lock().unwrap().preview_calls += 1;
        let docs = self.evaluate(prefix, collection).await?;
        Ok(docs.into_iter().take(limit).collect())
    }

    async fn count(&self, prefix: &Pipeline, collection: &str) -> ExecutorResult<u64> {
        self.state.lock().unwrap().count_calls += 1;
        let docs = self.evaluate(prefix, collection).await?;
        Ok(docs.len() as u64)
    }
}
