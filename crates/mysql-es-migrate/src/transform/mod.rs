//! Row to document transformation.
//!
//! Decoded rows are paired with their column names to form flat documents,
//! every field rendered as a JSON string. Two bulk encodings are produced
//! from the same documents:
//!
//! - structured actions, one `{"_index", "_type", "_source"}` object per
//!   document, for the single-worker submit path
//! - a flat NDJSON body of alternating header and content lines, for the
//!   parallel submit path

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::source::{Column, Row};

/// One row, keyed by column name, bound for a specific index.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub index: String,
    pub doc_type: String,
    pub fields: Map<String, Value>,
}

/// A structured bulk action.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkAction {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_source")]
    pub source: Map<String, Value>,
}

/// Pair each row with the column list to build documents.
///
/// Only the first `row_count` rows are taken; a short final batch can hand
/// over fewer valid rows than the buffer holds. Rows and columns are zipped
/// positionally, so a ragged row is truncated to the shorter of the two;
/// columns past the row's end are simply absent from that document.
pub fn documents(
    rows: Vec<Row>,
    row_count: usize,
    columns: &[Column],
    index: &str,
    doc_type: &str,
) -> Vec<Document> {
    rows.into_iter()
        .take(row_count)
        .map(|row| {
            let fields = columns
                .iter()
                .zip(row.iter())
                .map(|(col, value)| (col.name.clone(), Value::String(value.to_string())))
                .collect();
            Document {
                index: index.to_string(),
                doc_type: doc_type.to_string(),
                fields,
            }
        })
        .collect()
}

/// Re-shape documents into structured bulk actions.
pub fn bulk_actions(docs: Vec<Document>) -> Vec<BulkAction> {
    docs.into_iter()
        .map(|doc| BulkAction {
            index: doc.index,
            doc_type: doc.doc_type,
            source: doc.fields,
        })
        .collect()
}

/// Flatten documents into alternating header and content values.
///
/// Each document contributes a header naming its index and type followed by
/// its fields object, in row order, ready to be newline-joined into a raw
/// bulk body.
pub fn ndjson_pairs(docs: &[Document]) -> Vec<Value> {
    let mut pairs = Vec::with_capacity(docs.len() * 2);
    for doc in docs {
        pairs.push(json!({"index": {"_index": doc.index, "_type": doc.doc_type}}));
        pairs.push(Value::Object(doc.fields.clone()));
    }
    pairs
}

/// Join flattened pairs into an NDJSON bulk body.
///
/// The body always ends with a newline, which the bulk endpoint requires.
pub fn ndjson_body(pairs: &[Value]) -> String {
    let mut body = pairs
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    body.push('\n');
    body
}
