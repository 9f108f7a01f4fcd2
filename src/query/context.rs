//! Query evaluation context
//!
//! Compiled query trees can be evaluated locally against a set of
//! [`IndexedDocument`]s. Each document is viewed as one JSON object holding
//! its attributes plus the `_id` / `_type` meta fields, and dotted field paths
//! resolve through nested objects and arrays the way the backend flattens them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Meta field holding the document identifier
pub const ID_FIELD: &str = "_id";

/// Meta field holding the document type tag
pub const TYPE_FIELD: &str = "_type";

/// A document as stored by an executor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub source: Map<String, Value>,
}

impl IndexedDocument {
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>, source: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            source,
        }
    }

    /// Attributes plus meta fields, as queries see them
    pub fn fields(&self) -> Value {
        let mut fields = self.source.clone();
        fields.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        fields.insert(TYPE_FIELD.to_string(), Value::String(self.doc_type.clone()));
        Value::Object(fields)
    }
}

/// Document set a compiled query is evaluated against
///
/// Document numbers are positions in the slice.
pub struct QueryContext<'a> {
    documents: &'a [IndexedDocument],
    fields: Vec<Value>,
}

impl<'a> QueryContext<'a> {
    pub fn new(documents: &'a [IndexedDocument]) -> Self {
        Self {
            documents,
            fields: documents.iter().map(IndexedDocument::fields).collect(),
        }
    }

    /// Get total number of documents
    pub fn total_docs(&self) -> usize {
        self.documents.len()
    }

    pub fn document(&self, docno: u32) -> Option<&'a IndexedDocument> {
        self.documents.get(docno as usize)
    }

    /// Field view of one document
    pub fn fields(&self, docno: u32) -> Option<&Value> {
        self.fields.get(docno as usize)
    }

    /// Field views of all documents, in document-number order
    pub fn all_fields(&self) -> &[Value] {
        &self.fields
    }
}

/// Resolve a dotted path to every scalar it reaches
///
/// Arrays are flattened at every step and nulls are dropped.
pub fn resolve_field<'v>(root: &'v Value, path: &str) -> Vec<&'v Value> {
    let mut current = vec![root];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            if let Some(child) = value.as_object().and_then(|map| map.get(segment)) {
                flatten_into(child, &mut next);
            }
        }
        current = next;
    }
    current.retain(|value| !value.is_object());
    current
}

fn flatten_into<'v>(value: &'v Value, out: &mut Vec<&'v Value>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| flatten_into(item, out)),
        Value::Null => {}
        other => out.push(other),
    }
}

/// Term representation of a scalar, as the backend compares it
pub fn term_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric value of a scalar; numeric strings count
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One scoped view per child object of the nested relation `path`
///
/// In each view the relation holds that single child, so inner clauses match
/// attributes of the same child.
pub fn nested_views(document: &Value, path: &str) -> Vec<Value> {
    let children: Vec<&Value> = match document.get(path) {
        Some(Value::Array(items)) => items.iter().filter(|item| item.is_object()).collect(),
        Some(child @ Value::Object(_)) => vec![child],
        _ => Vec::new(),
    };

    children
        .into_iter()
        .map(|child| {
            let mut view = document.clone();
            if let Some(map) = view.as_object_mut() {
                map.insert(path.to_string(), child.clone());
            }
            view
        })
        .collect()
}
