//! Trash bin entries for soft-deleted documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashKind {
    Proposal,
    Invoice,
    Receipt,
}

impl TrashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrashKind::Proposal => "proposal",
            TrashKind::Invoice => "invoice",
            TrashKind::Receipt => "receipt",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "proposal" => Ok(TrashKind::Proposal),
            "invoice" => Ok(TrashKind::Invoice),
            "receipt" => Ok(TrashKind::Receipt),
            _ => Err(DomainError::ValidationError("Invalid type".to_string())),
        }
    }
}

/// One trashed document; `label` is the title or document number
#[derive(Debug, Clone, Serialize)]
pub struct TrashedItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TrashKind,
    pub label: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(TrashKind::parse("invoice").unwrap(), TrashKind::Invoice);
        assert!(matches!(
            TrashKind::parse("client"),
            Err(DomainError::ValidationError(_))
        ));
    }
}
