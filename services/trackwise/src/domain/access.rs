//! Account access lifecycle.
//!
//! Business owners are never locked out by the staff workflow. Staff accounts
//! need an active profile and, when an employment record exists, an `active`
//! employment status.

use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;

use super::types::AccessRecord;
use crate::error::ServiceError;

pub const INACTIVE_ACCOUNT_MESSAGE: &str =
    "Your account is currently inactive or on leave. Please contact your administrator.";
pub const PROFILE_MISSING_MESSAGE: &str = "User profile not found. Please contact administrator.";
pub const NO_COMPANY_MESSAGE: &str = "Your account is not assigned to a company.";
pub const OWNER_ONLY_MESSAGE: &str = "Only business owners can perform this action.";

/// Decide whether an account may log in or keep using its session.
pub fn should_allow_access(role: Role, is_active: bool, staff_status: Option<StaffStatus>) -> bool {
    match role {
        Role::BusinessOwner => true,
        Role::Staff => is_active && staff_status.is_none_or(|s| s == StaffStatus::Active),
    }
}

impl AccessRecord {
    pub fn allows_access(&self) -> bool {
        should_allow_access(self.role, self.is_active, self.staff_status)
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            profile_id: self.profile_id,
            role: self.role,
            company_id: self.company_id,
        }
    }
}

/// Company every query of `actor` is scoped to.
pub fn tenant(actor: &Principal) -> Result<Uuid, ServiceError> {
    actor
        .company_id
        .ok_or(ServiceError::PermissionDenied(NO_COMPANY_MESSAGE))
}

/// Like [`tenant`], but only for business owners.
pub fn owner_tenant(actor: &Principal) -> Result<Uuid, ServiceError> {
    if !actor.is_owner() {
        return Err(ServiceError::PermissionDenied(OWNER_ONLY_MESSAGE));
    }
    tenant(actor)
}
