//! MySQL to Elasticsearch type mapping.

use serde_json::{json, Map, Value};

use crate::source::Column;

/// Date format declared for datetime columns, matching how [`crate::source::SqlValue`]
/// renders them.
pub const DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Elasticsearch field type inferred from a declared MySQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EsType {
    Integer,
    Date,
    Text,
}

impl EsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EsType::Integer => "integer",
            EsType::Date => "date",
            EsType::Text => "text",
        }
    }
}

/// Infer the Elasticsearch type for a declared MySQL type.
///
/// Any type containing "int" (tinyint through bigint) becomes an integer
/// field; datetime and timestamp become date fields; everything else,
/// including plain date and time columns, is indexed as text.
pub fn es_type(data_type: &str) -> EsType {
    let declared = data_type.to_lowercase();
    if declared.contains("int") {
        EsType::Integer
    } else if declared == "datetime" || declared == "timestamp" {
        EsType::Date
    } else {
        EsType::Text
    }
}

/// Build the index creation body for a table's columns.
pub fn index_mapping(doc_type: &str, columns: &[Column]) -> Value {
    let mut properties = Map::new();
    for col in columns {
        let field = match es_type(&col.data_type) {
            EsType::Date => json!({ "type": "date", "format": DATE_FORMAT }),
            ty => json!({ "type": ty.as_str() }),
        };
        properties.insert(col.name.clone(), field);
    }

    let mut type_body = Map::new();
    type_body.insert("properties".to_string(), Value::Object(properties));

    let mut mappings = Map::new();
    mappings.insert(doc_type.to_string(), Value::Object(type_body));

    json!({ "mappings": mappings })
}
