use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An uninterpreted item as returned by a page fetch.
///
/// The crawl engine only moves these around; normalizers are the single place
/// that looks inside.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum RawItem {
    Json(Value),
    Bytes(Vec<u8>),
}

impl RawItem {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RawItem::Json(value) => Some(value),
            RawItem::Bytes(_) => None,
        }
    }

    /// Best-effort upstream id, used only to make log lines searchable.
    pub fn id_hint(&self) -> Option<String> {
        match self.as_json()?.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Full payload rendered for logs and rejected-item files.
    pub fn to_log_string(&self) -> String {
        match self {
            RawItem::Json(value) => value.to_string(),
            RawItem::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl From<Value> for RawItem {
    fn from(value: Value) -> Self {
        RawItem::Json(value)
    }
}
