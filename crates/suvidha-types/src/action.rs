use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle event recorded against a complaint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Complaint filed by a citizen.
    Created,
    /// Details amended after filing.
    Updated,
    /// Routed to a department or officer.
    Assigned,
    /// Department reports the issue fixed.
    Resolved,
    /// Moved up the chain after a missed deadline.
    Escalated,
    /// Resolution confirmed; also used when a certificate is minted.
    Verified,
    Closed,
    Reopened,
}

impl Action {
    /// Every action, in lifecycle order.
    pub const ALL: [Action; 8] = [
        Action::Created,
        Action::Updated,
        Action::Assigned,
        Action::Resolved,
        Action::Escalated,
        Action::Verified,
        Action::Closed,
        Action::Reopened,
    ];

    /// Upper-case wire name, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Assigned => "ASSIGNED",
            Self::Resolved => "RESOLVED",
            Self::Escalated => "ESCALATED",
            Self::Verified => "VERIFIED",
            Self::Closed => "CLOSED",
            Self::Reopened => "REOPENED",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = TypeError;

    /// Case-insensitive parse of the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TypeError::UnknownAction(s.to_string()))
    }
}
