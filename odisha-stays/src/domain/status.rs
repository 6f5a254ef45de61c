use serde::{Deserialize, Serialize};

use odisha_shared::errors::{AppError, ErrorCode};

/// Lifecycle state of a stay request.
///
/// Stored as lowercase text. Older rows may say `accepted` (read as
/// [`StayStatus::Approved`]) or carry no status at all (read as
/// [`StayStatus::Pending`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StayStatus {
    Pending,
    #[serde(alias = "accepted")]
    Approved,
    Rejected,
}

impl StayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Decode the nullable `status` column.
    pub fn from_column(value: Option<&str>) -> Result<Self, AppError> {
        value.map_or(Ok(Self::Pending), |s| s.parse())
    }

    /// Apply a host decision under the given policy.
    pub fn transition(self, decision: Decision, policy: TransitionPolicy) -> Result<Self, AppError> {
        let target = decision.target();
        match policy {
            TransitionPolicy::Permissive => Ok(target),
            TransitionPolicy::Strict if self.is_terminal() => Err(AppError::with_details(
                ErrorCode::StayAlreadyDecided,
                format!("stay request is already {self}"),
                serde_json::json!({ "current": self.as_str(), "requested": target.as_str() }),
            )),
            TransitionPolicy::Strict => Ok(target),
        }
    }
}

impl std::fmt::Display for StayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StayStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" | "accepted" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::new(
                ErrorCode::InvalidStayStatus,
                format!("unknown stay status '{other}'"),
            )),
        }
    }
}

/// What a host (or an admin) does with a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(&self) -> StayStatus {
        match self {
            Self::Approve => StayStatus::Approved,
            Self::Reject => StayStatus::Rejected,
        }
    }
}

/// How decisions on already decided requests are treated.
///
/// `Strict` only allows `pending -> approved | rejected`. `Permissive` applies
/// every decision, last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    #[default]
    Strict,
    Permissive,
}
