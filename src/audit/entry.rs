//! Audit entry data structures
//!
//! Defines the operations recorded against service notes and the entry
//! format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Note was registered
    Create,
    /// Note was cancelled
    Cancel,
    /// Cancelled note was recovered
    Recover,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Cancel => write!(f, "CANCEL"),
            Operation::Recover => write!(f, "RECOVER"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Type of operation performed
    pub operation: Operation,

    /// Folio of the affected note
    pub entity_id: String,

    /// Human-readable description (customer name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// JSON snapshot before the operation (status changes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// JSON snapshot after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Short description of what changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            summary: None,
        }
    }

    /// Create a new audit entry for a cancel or recover operation
    pub fn status_change<T: Serialize>(
        operation: Operation,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        summary: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_id: entity_id.into(),
            entity_name,
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            summary,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} folio {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!("\n  Changes: {}", summary));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Cancel.to_string(), "CANCEL");
        assert_eq!(Operation::Recover.to_string(), "RECOVER");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"folio": 1, "customer_name": "Ana"});
        let entry = AuditEntry::create("1", Some("Ana".to_string()), &data);

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_id, "1");
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_status_change_entry() {
        let before = json!({"status": "active"});
        let after = json!({"status": "cancelled"});

        let entry = AuditEntry::status_change(
            Operation::Cancel,
            "4",
            None,
            &before,
            &after,
            Some("status: active -> cancelled".to_string()),
        );

        assert_eq!(entry.operation, Operation::Cancel);
        assert!(entry.before.is_some());
        assert_eq!(
            entry.summary,
            Some("status: active -> cancelled".to_string())
        );
    }

    #[test]
    fn test_serialization() {
        let entry = AuditEntry::create("2", None, &json!({"folio": 2}));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"operation\":\"create\""));
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.operation, Operation::Create);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::status_change(
            Operation::Recover,
            "7",
            Some("Taller Ruiz".to_string()),
            &json!({}),
            &json!({}),
            Some("date: 2024-03-01".to_string()),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("RECOVER folio 7"));
        assert!(formatted.contains("Taller Ruiz"));
        assert!(formatted.contains("Changes: date: 2024-03-01"));
    }
}
