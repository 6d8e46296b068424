//! Account roles within a company tenant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Role of an account inside its company.
///
/// Stored as `snake_case` text (`business_owner`, `staff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    BusinessOwner,
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BusinessOwner => "business_owner",
            Self::Staff => "staff",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BusinessOwner => "Business Owner",
            Self::Staff => "Staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business_owner" => Ok(Self::BusinessOwner),
            "staff" => Ok(Self::Staff),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}
