use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use trackwise_core::error::FieldErrors;
use trackwise_domain::issue::{IssuePriority, IssueStatus, IssueType};
use trackwise_domain::pagination::{PageRequest, Sort};
use trackwise_domain::product::{Category, LOW_STOCK_THRESHOLD, StockStatus, Unit};
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;

// ── Email verification ───────────────────────────────────────────────────────

/// Verification code length in decimal digits.
pub const OTP_LEN: usize = 6;

/// Verification code time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 600;

/// One-time code bound to an email address before an account exists.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub is_used: bool,
}

impl OtpRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::seconds(OTP_TTL_SECS)
    }
}

/// Trim and lower-case an email for storage and comparison.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Coarse shape check: one `@` with text on both sides and no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

// ── Accounts ─────────────────────────────────────────────────────────────────

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const DEFAULT_LOCATION: &str = "Main Office";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub phone_number: String,
    pub profile_picture_key: Option<String>,
    pub assigned_location: String,
    pub department: String,
    pub position: String,
    pub date_joined: DateTime<Utc>,
    pub is_active: bool,
    pub notes: String,
}

/// Defaults written to a profile created through self-registration.
#[derive(Debug, Clone, Copy)]
pub struct ProfileDefaults {
    pub department: &'static str,
    pub position: &'static str,
    pub notes: &'static str,
}

pub const OWNER_PROFILE_DEFAULTS: ProfileDefaults = ProfileDefaults {
    department: "Management",
    position: "Owner",
    notes: "Business owner account",
};

pub const STAFF_PROFILE_DEFAULTS: ProfileDefaults = ProfileDefaults {
    department: "General",
    position: "Staff Member",
    notes: "Staff account",
};

/// User, profile and company as shown on the account page.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub profile: Option<Profile>,
    pub company: Option<Company>,
}

/// Stored credentials looked up at login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// Everything written when a verified registration is accepted.
///
/// `new_company` is inserted first when present; `profile.company_id`
/// already points at it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user: User,
    pub password_hash: String,
    pub profile: Profile,
    pub new_company: Option<Company>,
}

#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub assigned_location: String,
    pub department: String,
    pub position: String,
    pub profile_picture_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompanyChanges {
    pub name: String,
    pub address: String,
    pub contact_info: String,
}

/// Flags that decide whether an account may use the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    /// `None` when no employment record exists.
    pub staff_status: Option<StaffStatus>,
}

/// Record a message when `username` is not 1–150 of `[A-Za-z0-9@.+_-]`.
pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.is_empty() {
        errors.add("username", "This field is required.");
    } else if username.chars().count() > USERNAME_MAX_LEN {
        errors.add("username", "Username must be 150 characters or fewer.");
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '_' | '-'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

pub fn validate_password(password: &str, field: &str, errors: &mut FieldErrors) {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            field,
            "This password is too short. It must contain at least 8 characters.",
        );
    }
}

pub fn validate_email_field(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        errors.add("email", "This field is required.");
    } else if !is_plausible_email(email) {
        errors.add("email", "Enter a valid email address.");
    }
}

/// Record a "required" message when `value` is blank.
pub fn require(value: &str, field: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
    }
}

// ── Inventory ────────────────────────────────────────────────────────────────

pub const ITEM_NAME_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub item_name: String,
    pub image_key: Option<String>,
    pub category: Category,
    pub quantity: i32,
    pub unit: Unit,
    pub cost_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stock value of this line: quantity × unit cost.
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.cost_price
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::for_quantity(self.quantity)
    }
}

/// Validated product fields for create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub item_name: String,
    pub image_key: Option<String>,
    pub category: Category,
    pub quantity: i32,
    pub unit: Unit,
    pub cost_price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    /// Matches item name or category, case-insensitive.
    pub search: Option<String>,
    pub category: Option<Category>,
    /// Order by unit cost instead of newest first.
    pub cost_order: Option<Sort>,
    pub page: PageRequest,
}

/// Company-wide stock aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryTotals {
    pub total_products: u64,
    pub total_inventory_value: Decimal,
    /// `0 < quantity <= LOW_STOCK_THRESHOLD`
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
}

impl InventoryTotals {
    /// Aggregate an in-memory product list.
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        products
            .into_iter()
            .fold(Self::default(), |mut totals, product| {
                totals.total_products += 1;
                totals.total_inventory_value += product.total_value();
                if product.quantity == 0 {
                    totals.out_of_stock_count += 1;
                } else if product.quantity <= LOW_STOCK_THRESHOLD {
                    totals.low_stock_count += 1;
                }
                totals
            })
    }
}

// ── Staff ────────────────────────────────────────────────────────────────────

/// Employment attributes editable by the business owner.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffDetails {
    pub employee_id: String,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub status: StaffStatus,
    pub assigned_locations: Vec<String>,
    pub permissions: serde_json::Value,
    pub notes: String,
}

impl StaffDetails {
    /// Location written to the profile: the first assigned location.
    pub fn primary_location(&self) -> &str {
        self.assigned_locations
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOCATION)
    }
}

/// A staff employment record joined with its user and profile.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub company_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub details: StaffDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub staff_id: Uuid,
    pub user: User,
    pub password_hash: String,
    pub profile: Profile,
    pub details: StaffDetails,
}

#[derive(Debug, Clone)]
pub struct StaffChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub details: StaffDetails,
}

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    /// Matches name, email, employee id, position or department.
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub on_leave: u64,
}

impl StaffCounts {
    pub fn tally(statuses: impl IntoIterator<Item = StaffStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut c, status| {
            c.total += 1;
            match status {
                StaffStatus::Active => c.active += 1,
                StaffStatus::Inactive => c.inactive += 1,
                StaffStatus::OnLeave => c.on_leave += 1,
            }
            c
        })
    }
}

/// Split a stored comma-separated location list.
pub fn split_locations(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn join_locations(locations: &[String]) -> String {
    locations.join(", ")
}

// ── Issues ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: Uuid,
    pub company_id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub attachment_key: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Apply a status change, maintaining `resolved_at`.
    pub fn with_status(mut self, status: IssueStatus, now: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = now;
        if status.is_terminal() {
            self.resolved_at.get_or_insert(now);
        } else {
            self.resolved_at = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueComment {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub author_id: Uuid,
    pub comment: String,
    pub is_business_owner_note: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub issue_type: Option<IssueType>,
    /// Matches title or description.
    pub search: Option<String>,
    /// Restrict to one reporter's profile.
    pub reporter_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueStatusCounts {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

impl IssueStatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = IssueStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut c, status| {
            c.total += 1;
            match status {
                IssueStatus::Pending => c.pending += 1,
                IssueStatus::InProgress => c.in_progress += 1,
                IssueStatus::Resolved => c.resolved += 1,
                IssueStatus::Closed => c.closed += 1,
            }
            c
        })
    }
}

// ── Email ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}
