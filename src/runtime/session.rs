use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::runtime::printer::pr_str;
use crate::runtime::Value;

/// One `deftest` result
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    /// Name given to `deftest`
    pub name: String,
    /// Vector of the results of each body form
    pub result: Value,
}

// Values are not data in general (functions, atoms), so the result is
// exported as its readable text.
impl Serialize for TestRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("TestRecord", 2)?;
        record.serialize_field("test", &self.name)?;
        record.serialize_field("result", &pr_str(&self.result, true))?;
        record.end()
    }
}

/// Ordered `deftest` results of one evaluator, for an external test runner
#[derive(Debug, Default)]
pub struct TestSession {
    records: Vec<TestRecord>,
}

impl TestSession {
    /// Creates an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result
    pub fn record(&mut self, name: impl Into<String>, result: Value) {
        self.records.push(TestRecord {
            name: name.into(),
            result,
        });
    }

    /// Results in recording order
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    /// Number of recorded results
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            tracing::warn!(discarded = self.records.len(), "clearing test results");
        }
        self.records.clear();
    }

    /// Records as a JSON array of `{"test": .., "result": ..}` objects
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}
