//! Per-field outcomes and the aggregate fill report.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Filled,
    Skipped,
    Failed,
}

/// Classified result of attempting one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    pub field_name: String,
    pub status: FieldStatus,
    pub value: Option<String>,
    pub error: Option<String>,
}

impl FieldOutcome {
    pub fn filled(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            status: FieldStatus::Filled,
            value: Some(value.into()),
            error: None,
        }
    }

    pub fn skipped(
        field_name: impl Into<String>,
        value: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            status: FieldStatus::Skipped,
            value,
            error: Some(reason.into()),
        }
    }

    pub fn failed(
        field_name: impl Into<String>,
        value: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            status: FieldStatus::Failed,
            value,
            error: Some(reason.into()),
        }
    }
}

/// Aggregate result of one fill request.
///
/// `success` is always derived: true iff the fill ran to completion (no
/// operation-level error) and the failed list is empty. There is no way to
/// set it independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub success: bool,
    pub filled_fields: Vec<FieldOutcome>,
    pub skipped_fields: Vec<FieldOutcome>,
    pub failed_fields: Vec<FieldOutcome>,
    /// Full-page PNG of the final form state, base64-encoded on the wire.
    #[serde(with = "base64_bytes")]
    pub screenshot: Option<Vec<u8>>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl FillReport {
    /// Aggregate a completed run: partitions outcomes by status, preserving
    /// fill order within each list, and derives `success`.
    pub fn completed(outcomes: Vec<FieldOutcome>, screenshot: Vec<u8>, elapsed: Duration) -> Self {
        let mut filled_fields = Vec::new();
        let mut skipped_fields = Vec::new();
        let mut failed_fields = Vec::new();
        for outcome in outcomes {
            match outcome.status {
                FieldStatus::Filled => filled_fields.push(outcome),
                FieldStatus::Skipped => skipped_fields.push(outcome),
                FieldStatus::Failed => failed_fields.push(outcome),
            }
        }
        Self {
            success: failed_fields.is_empty(),
            filled_fields,
            skipped_fields,
            failed_fields,
            screenshot: Some(screenshot),
            duration_ms: elapsed.as_millis() as u64,
            error: None,
        }
    }

    /// Report for an operation that aborted before per-field processing
    /// completed (session init, navigation, submission detected): empty
    /// outcome lists, no screenshot, the failure as the top-level error.
    pub fn aborted(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            filled_fields: Vec::new(),
            skipped_fields: Vec::new(),
            failed_fields: Vec::new(),
            screenshot: None,
            duration_ms: elapsed.as_millis() as u64,
            error: Some(error.into()),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
