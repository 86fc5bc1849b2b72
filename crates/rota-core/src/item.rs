use crate::types::{ItemId, WorkerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub assignee: Option<WorkerId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_email: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, String>,
}

impl Item {
    pub fn is_assigned(&self) -> bool {
        self.assignee.is_some()
    }
}

/// Payload of an item before the store hands out its sequence number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub submitter_name: Option<String>,
    #[serde(default)]
    pub submitter_email: Option<String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

impl NewItem {
    pub fn into_item(self, id: ItemId, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            assignee: None,
            created_at,
            submitter_name: self.submitter_name,
            submitter_email: self.submitter_email,
            answers: self.answers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    All,
    Assigned,
    Unassigned,
}

impl ItemFilter {
    pub fn from_flag(assigned: Option<bool>) -> Self {
        match assigned {
            Some(true) => ItemFilter::Assigned,
            Some(false) => ItemFilter::Unassigned,
            None => ItemFilter::All,
        }
    }

    pub fn matches(self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Assigned => item.is_assigned(),
            ItemFilter::Unassigned => !item.is_assigned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_unassigned() {
        let mut answers = BTreeMap::new();
        answers.insert("A".to_string(), "yes".to_string());
        let item = NewItem {
            submitter_name: Some("Rui".into()),
            submitter_email: None,
            answers,
        }
        .into_item(3, Utc::now());
        assert_eq!(item.id, 3);
        assert!(!item.is_assigned());
        assert_eq!(item.answers["A"], "yes");
    }

    #[test]
    fn filter_matches_by_assignment() {
        let mut item = NewItem::default().into_item(1, Utc::now());
        assert!(ItemFilter::Unassigned.matches(&item));
        assert!(!ItemFilter::Assigned.matches(&item));
        item.assignee = Some(uuid::Uuid::new_v4());
        assert!(ItemFilter::Assigned.matches(&item));
        assert!(ItemFilter::All.matches(&item));
    }

    #[test]
    fn payload_fields_are_optional_in_json() {
        let json = r#"{"id":4,"created_at":"2024-05-01T10:00:00Z"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.assignee, None);
        assert!(item.answers.is_empty());
    }
}
