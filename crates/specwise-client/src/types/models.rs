/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::TaskStatus;

/// Items at or above this confidence are pre-selected for XML export
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// One asynchronous processing job tracked by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "filename", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub status: TaskStatus,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Task {
    pub fn new(id: impl Into<String>, status: TaskStatus) -> Self {
        let id = id.into();
        Self {
            collection_id: id.clone(),
            id,
            description: None,
            file_name: None,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Human-readable name: file name, then description, then a generic fallback
    pub fn label(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.description.as_deref().filter(|d| !d.is_empty()))
            .unwrap_or("Task")
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(DateTime::from_timestamp_millis)
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        self.updated_at.and_then(DateTime::from_timestamp_millis)
    }
}

/// One extracted line item of an uploaded document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub quantity: Decimal,
    #[serde(default, rename = "quantityunit")]
    pub quantity_unit: String,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
    #[serde(default, rename = "priceunit")]
    pub price_unit: String,
    /// Identifying key used when selecting items for XML export
    pub commission: String,
    #[serde(default)]
    pub confidence: f64,
}

impl LineItem {
    pub fn key(&self) -> &str {
        &self.commission
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE_THRESHOLD
    }
}

/// An uploaded document and its extraction results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default)]
    pub customer_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub is_xml_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_content: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl FileRecord {
    /// Owning task id, treating an empty string as absent
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    /// Download name for the generated XML: text before the first `.`, plus `.xml`
    pub fn xml_file_name(&self) -> String {
        let stem = self.filename.split('.').next().unwrap_or_default();
        let stem = if stem.is_empty() { "export" } else { stem };
        format!("{stem}.xml")
    }
}

mod serde_helpers {
    use super::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let raw = match value {
            Value::Null => return Ok(Decimal::ZERO),
            Value::String(raw) if raw.trim().is_empty() => return Ok(Decimal::ZERO),
            Value::String(raw) => raw,
            Value::Number(number) => number.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected decimal number or string, got {other}"
                )));
            }
        };

        Decimal::from_str(raw.trim())
            .or_else(|_| Decimal::from_scientific(raw.trim()))
            .map_err(serde::de::Error::custom)
    }

    pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }
}
