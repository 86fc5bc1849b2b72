use crate::error::{Result, RotaError};
use crate::types::{Eligibility, WorkerId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub status: Eligibility,
    pub created_at: DateTime<Utc>,
    /// Seniority key. Refreshed on every inactive → active transition so a
    /// returning worker lands at the back of the rotation.
    pub eligible_since: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            status: Eligibility::Active,
            created_at: now,
            eligible_since: now,
            status_updated_at: now,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_eligible(&self) -> bool {
        self.status.is_eligible()
    }

    /// Apply a status change at `now`.
    ///
    /// `latest_seniority` is the newest `eligible_since` among the workers
    /// that are currently eligible. On reactivation the new seniority is
    /// clamped strictly after it. Returns `false` when the status was
    /// already `status` and nothing changed.
    pub fn transition(
        &mut self,
        status: Eligibility,
        now: DateTime<Utc>,
        latest_seniority: Option<DateTime<Utc>>,
    ) -> bool {
        if self.status == status {
            return false;
        }
        if status.is_eligible() {
            self.eligible_since = match latest_seniority {
                Some(latest) if latest >= now => latest + Duration::nanoseconds(1),
                _ => now,
            };
        }
        self.status = status;
        self.status_updated_at = now;
        true
    }
}

/// Editable worker details. `None` leaves a field unchanged; an empty
/// email clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Worker {
    /// Apply an edit of name and email. Status and seniority are untouched.
    pub fn apply(&mut self, update: WorkerUpdate) -> Result<()> {
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(RotaError::EmptyName);
            }
            self.name = name.to_string();
        }
        if let Some(email) = update.email {
            let email = email.trim();
            self.email = (!email.is_empty()).then(|| email.to_string());
        }
        Ok(())
    }
}

/// Parse a worker id given on the command line or in a URL path.
pub fn parse_worker_id(raw: &str) -> Result<WorkerId> {
    Uuid::parse_str(raw.trim()).map_err(|_| RotaError::InvalidWorkerId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_edits_details_but_not_seniority() {
        let mut w = Worker::new("Ana").with_email("ana@old.example");
        let before = w.clone();
        w.apply(WorkerUpdate {
            name: Some("  Ana Silva ".into()),
            email: Some(String::new()),
        })
        .unwrap();
        assert_eq!(w.name, "Ana Silva");
        assert_eq!(w.email, None);
        assert_eq!(w.eligible_since, before.eligible_since);
        assert_eq!(w.status, before.status);
    }

    #[test]
    fn apply_rejects_blank_name() {
        let mut w = Worker::new("Ana");
        let err = w
            .apply(WorkerUpdate {
                name: Some(" ".into()),
                email: None,
            })
            .unwrap_err();
        assert!(matches!(err, RotaError::EmptyName));
        assert_eq!(w.name, "Ana");
    }

    #[test]
    fn new_worker_is_active_with_seniority_at_creation() {
        let w = Worker::new("Ana").with_email("ana@example.com");
        assert!(w.is_eligible());
        assert_eq!(w.eligible_since, w.created_at);
        assert_eq!(w.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn deactivate_keeps_seniority() {
        let mut w = Worker::new("Ana");
        let before = w.eligible_since;
        let later = Utc::now() + Duration::seconds(5);
        assert!(w.transition(Eligibility::Inactive, later, None));
        assert_eq!(w.status, Eligibility::Inactive);
        assert_eq!(w.eligible_since, before);
        assert_eq!(w.status_updated_at, later);
    }

    #[test]
    fn reactivate_refreshes_seniority() {
        let mut w = Worker::new("Ana");
        let created = w.created_at;
        let t1 = created + Duration::seconds(10);
        let t2 = created + Duration::seconds(20);
        w.transition(Eligibility::Inactive, t1, None);
        w.transition(Eligibility::Active, t2, Some(t1 - Duration::seconds(1)));
        assert_eq!(w.eligible_since, t2);
        assert_eq!(w.created_at, created);
    }

    #[test]
    fn reactivate_is_clamped_after_latest_seniority() {
        let mut w = Worker::new("Ana");
        let now = w.created_at + Duration::seconds(1);
        w.transition(Eligibility::Inactive, now, None);
        // Another worker's seniority is ahead of our clock.
        let latest = now + Duration::seconds(30);
        w.transition(Eligibility::Active, now, Some(latest));
        assert!(w.eligible_since > latest);
    }

    #[test]
    fn same_status_is_noop() {
        let mut w = Worker::new("Ana");
        let before = w.clone();
        assert!(!w.transition(Eligibility::Active, Utc::now(), None));
        assert_eq!(w, before);
    }

    #[test]
    fn parse_worker_id_rejects_garbage() {
        assert!(parse_worker_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_worker_id(&id.to_string()).unwrap(), id);
    }
}
