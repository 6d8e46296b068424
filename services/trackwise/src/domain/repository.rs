#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use trackwise_domain::pagination::Page;
use trackwise_domain::staff::StaffStatus;

use crate::domain::types::{
    AccessRecord, Account, Company, CompanyChanges, Credentials, InventoryFilter,
    InventoryTotals, Issue, IssueComment, IssueFilter, MailError, NewAccount, NewStaff, OtpRecord,
    OutgoingEmail, Product, ProductDraft, ProfileChanges, StaffChanges, StaffFilter, StaffMember,
};
use crate::error::ServiceError;

/// Users, their profiles and the registration write path.
pub trait AccountRepository: Send + Sync {
    /// `except` excludes one user, for "unique other than myself" checks.
    async fn email_taken(&self, email: &str, except: Option<Uuid>)
    -> Result<bool, ServiceError>;

    async fn username_taken(&self, username: &str) -> Result<bool, ServiceError>;

    /// Insert company (if new), user and profile, and delete the email's
    /// verification rows, in one transaction.
    async fn create_account(&self, account: &NewAccount) -> Result<(), ServiceError>;

    async fn find_credentials(&self, username: &str)
    -> Result<Option<Credentials>, ServiceError>;

    async fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ServiceError>;

    /// Returns `false` if the user has no profile.
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError>;

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError>;
}

pub trait CompanyRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Company>, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<Company>, ServiceError>;
    async fn update(
        &self,
        id: Uuid,
        changes: &CompanyChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, ServiceError>;

    /// Profiles of the company with the staff role, with or without an
    /// employment record.
    async fn staff_count(&self, company_id: Uuid) -> Result<u64, ServiceError>;
}

/// Read side of the access-lifecycle gate.
pub trait AccessRepository: Send + Sync {
    /// `None` when the user has no profile.
    async fn load_access(&self, user_id: Uuid) -> Result<Option<AccessRecord>, ServiceError>;
}

/// Email verification codes.
pub trait OtpRepository: Send + Sync {
    /// Delete every record for `record.email`, then insert `record`.
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), ServiceError>;

    /// Most recently created unused record for `email`.
    async fn latest_unused(&self, email: &str) -> Result<Option<OtpRecord>, ServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;

    /// Mark `id` used and delete the other unused records for its email.
    async fn mark_used(&self, id: Uuid, email: &str) -> Result<(), ServiceError>;

    /// Whether a code for `email` has been verified and not yet consumed.
    async fn has_verified(&self, email: &str) -> Result<bool, ServiceError>;
}

/// Company-scoped product inventory.
pub trait ProductRepository: Send + Sync {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<Page<Product>, ServiceError>;

    /// Every product of the company, ordered by name.
    async fn all(&self, company_id: Uuid) -> Result<Vec<Product>, ServiceError>;

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Product>, ServiceError>;

    async fn create(&self, product: &Product) -> Result<(), ServiceError>;

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError>;

    /// Add `delta` to the quantity unless the result would be negative, in
    /// which case the row is left untouched. Returns the row as stored
    /// afterwards, or `None` if it does not exist.
    async fn adjust_quantity(
        &self,
        company_id: Uuid,
        id: Uuid,
        delta: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError>;

    /// Aggregates over the products matching the filter's search and
    /// category; ordering and paging are ignored.
    async fn totals(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<InventoryTotals, ServiceError>;

    async fn recently_created(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError>;

    async fn recently_updated(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError>;

    async fn updated_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Product>, ServiceError>;
}

/// Company-scoped staff employment records.
pub trait StaffRepository: Send + Sync {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &StaffFilter,
    ) -> Result<Vec<StaffMember>, ServiceError>;

    async fn find(&self, company_id: Uuid, id: Uuid)
    -> Result<Option<StaffMember>, ServiceError>;

    async fn employee_id_taken(
        &self,
        employee_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, ServiceError>;

    /// Insert user, profile and staff record in one transaction.
    async fn create(&self, staff: &NewStaff) -> Result<(), ServiceError>;

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &StaffChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<StaffMember>, ServiceError>;

    /// Delete the staff member's user account. Returns `true` if it existed.
    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError>;

    async fn set_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        status: StaffStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError>;
}

/// Company-scoped issue reports and their comments.
pub trait IssueRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, company_id: Uuid, filter: &IssueFilter)
    -> Result<Vec<Issue>, ServiceError>;

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Issue>, ServiceError>;

    async fn create(&self, issue: &Issue) -> Result<(), ServiceError>;

    /// Persist status, `updated_at` and `resolved_at`.
    async fn save_status(&self, issue: &Issue) -> Result<(), ServiceError>;

    /// Oldest first.
    async fn comments(&self, issue_id: Uuid) -> Result<Vec<IssueComment>, ServiceError>;

    async fn add_comment(&self, comment: &IssueComment) -> Result<(), ServiceError>;
}

/// Outbound email delivery.
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
