use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;
use trackwise_core::error::FieldErrors;
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;

use crate::domain::access::owner_tenant;
use crate::domain::password::hash_password_on_pool;
use crate::domain::repository::{AccountRepository, StaffRepository};
use crate::domain::types::{
    NewStaff, Profile, StaffChanges, StaffCounts, StaffDetails, StaffFilter, StaffMember,
    normalize_email, require, validate_email_field,
};
use crate::error::ServiceError;
use crate::usecase::registration::{DUPLICATE_EMAIL, SignupFields, check_signup_fields, new_user};

pub const DUPLICATE_EMPLOYEE_ID: &str = "An employee with this ID already exists.";

/// Trim free-text employment fields and check the ones every record needs.
fn check_details(details: &mut StaffDetails, errors: &mut FieldErrors) {
    details.employee_id = details.employee_id.trim().to_owned();
    details.position = details.position.trim().to_owned();
    details.department = details.department.trim().to_owned();
    details.assigned_locations = details
        .assigned_locations
        .iter()
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect();
    require(&details.employee_id, "employee_id", errors);
    require(&details.position, "position", errors);
    require(&details.department, "department", errors);
    if details.salary.is_some_and(|s| s.is_sign_negative() && !s.is_zero()) {
        errors.add("salary", "Salary must be zero or greater.");
    }
}

// ── ListStaff ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StaffListing {
    pub members: Vec<StaffMember>,
    pub counts: StaffCounts,
}

pub struct ListStaffUseCase<S: StaffRepository> {
    pub staff: S,
}

impl<S: StaffRepository> ListStaffUseCase<S> {
    pub async fn execute(
        &self,
        actor: &Principal,
        filter: StaffFilter,
    ) -> Result<StaffListing, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let members = self.staff.list(company_id, &filter).await?;
        let counts = StaffCounts::tally(members.iter().map(|m| m.details.status));
        Ok(StaffListing { members, counts })
    }
}

// ── GetStaff ─────────────────────────────────────────────────────────────────

pub struct GetStaffUseCase<S: StaffRepository> {
    pub staff: S,
}

impl<S: StaffRepository> GetStaffUseCase<S> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<StaffMember, ServiceError> {
        let company_id = owner_tenant(actor)?;
        self.staff
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── CreateStaff ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewStaffInput {
    pub account: SignupFields,
    pub details: StaffDetails,
}

pub struct CreateStaffUseCase<S: StaffRepository, A: AccountRepository, C: Clock> {
    pub staff: S,
    pub accounts: A,
    pub clock: C,
}

impl<S: StaffRepository, A: AccountRepository, C: Clock> CreateStaffUseCase<S, A, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        input: NewStaffInput,
    ) -> Result<StaffMember, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let account = SignupFields {
            username: input.account.username.trim().to_owned(),
            email: normalize_email(&input.account.email),
            password: input.account.password,
            first_name: input.account.first_name.trim().to_owned(),
            last_name: input.account.last_name.trim().to_owned(),
            phone_number: input.account.phone_number.trim().to_owned(),
        };
        let mut details = input.details;

        // 1. Validate login and employment fields.
        let mut errors = FieldErrors::new();
        check_signup_fields(&self.accounts, &account, &mut errors).await?;
        check_details(&mut details, &mut errors);
        if !errors.contains("employee_id")
            && self.staff.employee_id_taken(&details.employee_id, None).await?
        {
            errors.add("employee_id", DUPLICATE_EMPLOYEE_ID);
        }
        errors.into_result()?;

        // 2. Build user, profile and employment record.
        let now = self.clock.now();
        let user = new_user(&account, now);
        let profile = Profile {
            id: Uuid::now_v7(),
            user_id: user.id,
            role: Role::Staff,
            company_id: Some(company_id),
            phone_number: account.phone_number.clone(),
            profile_picture_key: None,
            assigned_location: details.primary_location().to_owned(),
            department: details.department.clone(),
            position: details.position.clone(),
            date_joined: now,
            is_active: true,
            notes: details.notes.clone(),
        };
        let staff_id = Uuid::now_v7();

        // 3. Persist atomically.
        self.staff
            .create(&NewStaff {
                staff_id,
                user,
                password_hash: hash_password_on_pool(&account.password).await?,
                profile,
                details,
            })
            .await?;
        tracing::info!(staff_id = %staff_id, company_id = %company_id, "staff member created");

        self.staff
            .find(company_id, staff_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── UpdateStaff ──────────────────────────────────────────────────────────────

pub struct UpdateStaffUseCase<S: StaffRepository, A: AccountRepository, C: Clock> {
    pub staff: S,
    pub accounts: A,
    pub clock: C,
}

impl<S: StaffRepository, A: AccountRepository, C: Clock> UpdateStaffUseCase<S, A, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        id: Uuid,
        mut changes: StaffChanges,
    ) -> Result<StaffMember, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let existing = self
            .staff
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        changes.email = normalize_email(&changes.email);
        changes.first_name = changes.first_name.trim().to_owned();
        changes.last_name = changes.last_name.trim().to_owned();
        changes.phone_number = changes.phone_number.trim().to_owned();

        let mut errors = FieldErrors::new();
        validate_email_field(&changes.email, &mut errors);
        require(&changes.first_name, "first_name", &mut errors);
        require(&changes.last_name, "last_name", &mut errors);
        check_details(&mut changes.details, &mut errors);
        if !errors.contains("email")
            && self
                .accounts
                .email_taken(&changes.email, Some(existing.user_id))
                .await?
        {
            errors.add("email", DUPLICATE_EMAIL);
        }
        if !errors.contains("employee_id")
            && self
                .staff
                .employee_id_taken(&changes.details.employee_id, Some(id))
                .await?
        {
            errors.add("employee_id", DUPLICATE_EMPLOYEE_ID);
        }
        errors.into_result()?;

        self.staff
            .update(company_id, id, &changes, self.clock.now())
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── DeleteStaff ──────────────────────────────────────────────────────────────

pub struct DeleteStaffUseCase<S: StaffRepository> {
    pub staff: S,
}

impl<S: StaffRepository> DeleteStaffUseCase<S> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<(), ServiceError> {
        let company_id = owner_tenant(actor)?;
        if !self.staff.delete(company_id, id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(staff_id = %id, company_id = %company_id, "staff member deleted");
        Ok(())
    }
}

// ── ToggleStaffStatus ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusToggle {
    pub new_status: StaffStatus,
    /// `true` when the member was reactivated.
    pub activated: bool,
}

pub struct ToggleStaffStatusUseCase<S: StaffRepository, C: Clock> {
    pub staff: S,
    pub clock: C,
}

impl<S: StaffRepository, C: Clock> ToggleStaffStatusUseCase<S, C> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<StatusToggle, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let member = self
            .staff
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let new_status = member.details.status.toggled();
        if !self
            .staff
            .set_status(company_id, id, new_status, self.clock.now())
            .await?
        {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(staff_id = %id, status = %new_status, "staff status toggled");
        Ok(StatusToggle {
            new_status,
            activated: new_status == StaffStatus::Active,
        })
    }
}
