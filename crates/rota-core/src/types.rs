use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque worker identifier.
pub type WorkerId = Uuid;

/// Monotonic item sequence number. Starts at 1 and is never reused.
pub type ItemId = u64;

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Active,
    Inactive,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Eligibility::Active => "active",
            Eligibility::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Eligibility {
    type Err = crate::error::RotaError;

    /// Accepts the legacy "Ativo" / "Não Ativo" labels alongside the
    /// canonical snake_case names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" | "Ativo" => Ok(Eligibility::Active),
            "inactive" | "Não Ativo" | "Nao Ativo" => Ok(Eligibility::Inactive),
            _ => Err(crate::error::RotaError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AssignOutcome
// ---------------------------------------------------------------------------

/// Result of a single-item assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignOutcome {
    /// This call wrote the assignee.
    Assigned { worker_id: WorkerId },
    /// No eligible workers; the item stays unassigned.
    Skipped,
    /// Another caller assigned the item first.
    AlreadyAssigned,
}

impl AssignOutcome {
    pub fn worker_id(&self) -> Option<WorkerId> {
        match self {
            AssignOutcome::Assigned { worker_id } => Some(*worker_id),
            _ => None,
        }
    }
}
