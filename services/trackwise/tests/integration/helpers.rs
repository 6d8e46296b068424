use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use trackwise::domain::password::hash_password;
use trackwise::domain::repository::{
    AccessRepository, AccountRepository, CompanyRepository, EmailSender, IssueRepository,
    OtpRepository, ProductRepository, StaffRepository,
};
use trackwise::domain::types::{
    AccessRecord, Account, Company, CompanyChanges, Credentials, InventoryFilter,
    InventoryTotals, Issue, IssueComment, IssueFilter, MailError, NewAccount, NewStaff, OtpRecord,
    OutgoingEmail, Product, ProductDraft, Profile, ProfileChanges, StaffChanges, StaffDetails,
    StaffFilter, StaffMember, User,
};
use trackwise::error::ServiceError;
use trackwise_auth_types::principal::Principal;
use trackwise_domain::pagination::{Page, Sort};
use trackwise_domain::product::{Category, Unit};
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;

pub const PASSWORD: &str = "correct-horse-battery";

// ── MemoryStore ──────────────────────────────────────────────────────────────

pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct StaffRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub details: StaffDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Tables {
    pub companies: Vec<Company>,
    pub users: Vec<StoredUser>,
    pub profiles: Vec<Profile>,
    pub staff: Vec<StaffRecord>,
    pub products: Vec<Product>,
    pub issues: Vec<Issue>,
    pub comments: Vec<IssueComment>,
    pub otps: Vec<OtpRecord>,
}

impl Tables {
    fn member(&self, record: &StaffRecord) -> Option<StaffMember> {
        let profile = self.profiles.iter().find(|p| p.id == record.profile_id)?;
        let user = &self.users.iter().find(|u| u.user.id == profile.user_id)?.user;
        Some(StaffMember {
            id: record.id,
            user_id: user.id,
            profile_id: profile.id,
            company_id: profile.company_id?,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: profile.phone_number.clone(),
            details: record.details.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn members(&self, company_id: Uuid) -> Vec<StaffMember> {
        self.staff
            .iter()
            .filter_map(|r| self.member(r))
            .filter(|m| m.company_id == company_id)
            .collect()
    }

    fn delete_user(&mut self, user_id: Uuid) {
        let profile_ids: Vec<Uuid> = self
            .profiles
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        self.staff.retain(|s| !profile_ids.contains(&s.profile_id));
        self.issues.retain(|i| !profile_ids.contains(&i.reporter_id));
        self.comments.retain(|c| !profile_ids.contains(&c.author_id));
        self.profiles.retain(|p| p.user_id != user_id);
        self.users.retain(|u| u.user.id != user_id);
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn product_matches(product: &Product, company_id: Uuid, filter: &InventoryFilter) -> bool {
    product.company_id == company_id
        && filter.category.is_none_or(|c| product.category == c)
        && filter.search.as_deref().is_none_or(|term| {
            contains_ci(&product.item_name, term) || contains_ci(product.category.as_str(), term)
        })
}

/// Every repository port over one shared set of in-memory tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

impl AccountRepository for MemoryStore {
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|u| u.user.email == email && Some(u.user.id) != except))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.tables().users.iter().any(|u| u.user.username == username))
    }

    async fn create_account(&self, account: &NewAccount) -> Result<(), ServiceError> {
        let mut t = self.tables();
        if let Some(company) = &account.new_company {
            t.companies.push(company.clone());
        }
        t.users.push(StoredUser {
            user: account.user.clone(),
            password_hash: account.password_hash.clone(),
        });
        t.profiles.push(account.profile.clone());
        t.otps.retain(|o| o.email != account.user.email);
        Ok(())
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, ServiceError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| Credentials {
                user_id: u.user.id,
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ServiceError> {
        let t = self.tables();
        let Some(stored) = t.users.iter().find(|u| u.user.id == user_id) else {
            return Ok(None);
        };
        let profile = t.profiles.iter().find(|p| p.user_id == user_id).cloned();
        let company = profile
            .as_ref()
            .and_then(|p| p.company_id)
            .and_then(|id| t.companies.iter().find(|c| c.id == id).cloned());
        Ok(Some(Account {
            user: stored.user.clone(),
            profile,
            company,
        }))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        let mut t = self.tables();
        let Some(profile) = t.profiles.iter_mut().find(|p| p.user_id == user_id) else {
            return Ok(false);
        };
        profile.phone_number = changes.phone_number.clone();
        profile.assigned_location = changes.assigned_location.clone();
        profile.department = changes.department.clone();
        profile.position = changes.position.clone();
        if changes.profile_picture_key.is_some() {
            profile.profile_picture_key = changes.profile_picture_key.clone();
        }
        if let Some(stored) = t.users.iter_mut().find(|u| u.user.id == user_id) {
            stored.user.email = changes.email.clone();
            stored.user.first_name = changes.first_name.clone();
            stored.user.last_name = changes.last_name.clone();
            stored.user.updated_at = now;
        }
        Ok(true)
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if let Some(stored) = self.tables().users.iter_mut().find(|u| u.user.id == user_id) {
            stored.password_hash = password_hash.to_owned();
            stored.user.updated_at = now;
        }
        Ok(())
    }
}

impl CompanyRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Company>, ServiceError> {
        let mut companies = self.tables().companies.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Company>, ServiceError> {
        Ok(self.tables().companies.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &CompanyChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, ServiceError> {
        let mut t = self.tables();
        Ok(t.companies.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = changes.name.clone();
            c.address = changes.address.clone();
            c.contact_info = changes.contact_info.clone();
            c.updated_at = now;
            c.clone()
        }))
    }

    async fn staff_count(&self, company_id: Uuid) -> Result<u64, ServiceError> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .filter(|p| p.company_id == Some(company_id) && p.role == Role::Staff)
            .count() as u64)
    }
}

impl AccessRepository for MemoryStore {
    async fn load_access(&self, user_id: Uuid) -> Result<Option<AccessRecord>, ServiceError> {
        let t = self.tables();
        let Some(profile) = t.profiles.iter().find(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        let staff_status = t
            .staff
            .iter()
            .find(|s| s.profile_id == profile.id)
            .map(|s| s.details.status);
        Ok(Some(AccessRecord {
            user_id,
            profile_id: profile.id,
            role: profile.role,
            company_id: profile.company_id,
            is_active: profile.is_active,
            staff_status,
        }))
    }
}

impl OtpRepository for MemoryStore {
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), ServiceError> {
        let mut t = self.tables();
        t.otps.retain(|o| o.email != record.email);
        t.otps.push(record.clone());
        Ok(())
    }

    async fn latest_unused(&self, email: &str) -> Result<Option<OtpRecord>, ServiceError> {
        Ok(self
            .tables()
            .otps
            .iter()
            .filter(|o| o.email == email && !o.is_used)
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.tables().otps.retain(|o| o.id != id);
        Ok(())
    }

    async fn mark_used(&self, id: Uuid, email: &str) -> Result<(), ServiceError> {
        let mut t = self.tables();
        t.otps.retain(|o| o.id == id || o.email != email || o.is_used);
        if let Some(o) = t.otps.iter_mut().find(|o| o.id == id) {
            o.is_used = true;
        }
        Ok(())
    }

    async fn has_verified(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(self.tables().otps.iter().any(|o| o.email == email && o.is_used))
    }
}

impl ProductRepository for MemoryStore {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<Page<Product>, ServiceError> {
        let mut items: Vec<Product> = self
            .tables()
            .products
            .iter()
            .filter(|p| product_matches(p, company_id, filter))
            .cloned()
            .collect();
        match filter.cost_order {
            Some(Sort::Asc) => items.sort_by(|a, b| a.cost_price.cmp(&b.cost_price)),
            Some(Sort::Desc) => items.sort_by(|a, b| b.cost_price.cmp(&a.cost_price)),
            None => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        let total = items.len() as u64;
        let page = filter.page.clamped();
        let items = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn all(&self, company_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        let mut items: Vec<Product> = self
            .tables()
            .products
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(items)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Product>, ServiceError> {
        Ok(self
            .tables()
            .products
            .iter()
            .find(|p| p.id == id && p.company_id == company_id)
            .cloned())
    }

    async fn create(&self, product: &Product) -> Result<(), ServiceError> {
        self.tables().products.push(product.clone());
        Ok(())
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError> {
        let mut t = self.tables();
        Ok(t
            .products
            .iter_mut()
            .find(|p| p.id == id && p.company_id == company_id)
            .map(|p| {
                p.item_name = draft.item_name.clone();
                p.image_key = draft.image_key.clone();
                p.category = draft.category;
                p.quantity = draft.quantity;
                p.unit = draft.unit;
                p.cost_price = draft.cost_price;
                p.updated_at = now;
                p.clone()
            }))
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let mut t = self.tables();
        let before = t.products.len();
        t.products.retain(|p| !(p.id == id && p.company_id == company_id));
        Ok(t.products.len() != before)
    }

    async fn adjust_quantity(
        &self,
        company_id: Uuid,
        id: Uuid,
        delta: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError> {
        let mut t = self.tables();
        Ok(t
            .products
            .iter_mut()
            .find(|p| p.id == id && p.company_id == company_id)
            .map(|p| {
                if let Some(quantity) = p.quantity.checked_add(delta).filter(|q| *q >= 0) {
                    p.quantity = quantity;
                    p.updated_at = now;
                }
                p.clone()
            }))
    }

    async fn totals(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<InventoryTotals, ServiceError> {
        let t = self.tables();
        Ok(InventoryTotals::from_products(
            t.products.iter().filter(|p| product_matches(p, company_id, filter)),
        ))
    }

    async fn recently_created(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError> {
        let mut items = self.all(company_id).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn recently_updated(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError> {
        let mut items = self.all(company_id).await?;
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn updated_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Product>, ServiceError> {
        let mut items = self.all(company_id).await?;
        items.retain(|p| p.updated_at >= since);
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(items)
    }
}

impl StaffRepository for MemoryStore {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &StaffFilter,
    ) -> Result<Vec<StaffMember>, ServiceError> {
        let mut members: Vec<StaffMember> = self
            .tables()
            .members(company_id)
            .into_iter()
            .filter(|m| filter.status.is_none_or(|s| m.details.status == s))
            .filter(|m| {
                filter
                    .department
                    .as_deref()
                    .is_none_or(|d| contains_ci(&m.details.department, d))
            })
            .filter(|m| {
                filter.search.as_deref().is_none_or(|term| {
                    [
                        &m.first_name,
                        &m.last_name,
                        &m.email,
                        &m.details.employee_id,
                        &m.details.position,
                        &m.details.department,
                    ]
                    .iter()
                    .any(|field| contains_ci(field, term))
                })
            })
            .collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(members)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<StaffMember>, ServiceError> {
        Ok(self
            .tables()
            .members(company_id)
            .into_iter()
            .find(|m| m.id == id))
    }

    async fn employee_id_taken(
        &self,
        employee_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        Ok(self
            .tables()
            .staff
            .iter()
            .any(|s| s.details.employee_id == employee_id && Some(s.id) != except))
    }

    async fn create(&self, staff: &NewStaff) -> Result<(), ServiceError> {
        let mut t = self.tables();
        t.users.push(StoredUser {
            user: staff.user.clone(),
            password_hash: staff.password_hash.clone(),
        });
        t.profiles.push(staff.profile.clone());
        t.staff.push(StaffRecord {
            id: staff.staff_id,
            profile_id: staff.profile.id,
            details: staff.details.clone(),
            created_at: staff.user.created_at,
            updated_at: staff.user.created_at,
        });
        Ok(())
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &StaffChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<StaffMember>, ServiceError> {
        let mut t = self.tables();
        let Some(member) = t.members(company_id).into_iter().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(stored) = t.users.iter_mut().find(|u| u.user.id == member.user_id) {
            stored.user.first_name = changes.first_name.clone();
            stored.user.last_name = changes.last_name.clone();
            stored.user.email = changes.email.clone();
            stored.user.updated_at = now;
        }
        if let Some(profile) = t.profiles.iter_mut().find(|p| p.id == member.profile_id) {
            profile.phone_number = changes.phone_number.clone();
            profile.department = changes.details.department.clone();
            profile.position = changes.details.position.clone();
            profile.assigned_location = changes.details.primary_location().to_owned();
        }
        if let Some(record) = t.staff.iter_mut().find(|s| s.id == id) {
            record.details = changes.details.clone();
            record.updated_at = now;
        }
        Ok(t.members(company_id).into_iter().find(|m| m.id == id))
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let mut t = self.tables();
        let Some(member) = t.members(company_id).into_iter().find(|m| m.id == id) else {
            return Ok(false);
        };
        t.delete_user(member.user_id);
        Ok(true)
    }

    async fn set_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        status: StaffStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        let mut t = self.tables();
        if !t.members(company_id).iter().any(|m| m.id == id) {
            return Ok(false);
        }
        if let Some(record) = t.staff.iter_mut().find(|s| s.id == id) {
            record.details.status = status;
            record.updated_at = now;
        }
        Ok(true)
    }

}

impl IssueRepository for MemoryStore {
    async fn list(&self, company_id: Uuid, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let mut issues: Vec<Issue> = self
            .tables()
            .issues
            .iter()
            .filter(|i| i.company_id == company_id)
            .filter(|i| filter.status.is_none_or(|s| i.status == s))
            .filter(|i| filter.issue_type.is_none_or(|t| i.issue_type == t))
            .filter(|i| filter.reporter_id.is_none_or(|r| i.reporter_id == r))
            .filter(|i| {
                filter.search.as_deref().is_none_or(|term| {
                    contains_ci(&i.title, term) || contains_ci(&i.description, term)
                })
            })
            .cloned()
            .collect();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(issues)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Issue>, ServiceError> {
        Ok(self
            .tables()
            .issues
            .iter()
            .find(|i| i.id == id && i.company_id == company_id)
            .cloned())
    }

    async fn create(&self, issue: &Issue) -> Result<(), ServiceError> {
        self.tables().issues.push(issue.clone());
        Ok(())
    }

    async fn save_status(&self, issue: &Issue) -> Result<(), ServiceError> {
        if let Some(stored) = self.tables().issues.iter_mut().find(|i| i.id == issue.id) {
            stored.status = issue.status;
            stored.updated_at = issue.updated_at;
            stored.resolved_at = issue.resolved_at;
        }
        Ok(())
    }

    async fn comments(&self, issue_id: Uuid) -> Result<Vec<IssueComment>, ServiceError> {
        let mut comments: Vec<IssueComment> = self
            .tables()
            .comments
            .iter()
            .filter(|c| c.issue_id == issue_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn add_comment(&self, comment: &IssueComment) -> Result<(), ServiceError> {
        self.tables().comments.push(comment.clone());
        Ok(())
    }
}

// ── RecordingMailer ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailSender for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Delivery("connection refused".to_owned()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn seed_company(store: &MemoryStore, name: &str) -> Company {
    let now = Utc::now();
    let company = Company {
        id: Uuid::now_v7(),
        name: name.to_owned(),
        address: "1 Main Street".to_owned(),
        contact_info: "hello@example.com".to_owned(),
        created_at: now,
        updated_at: now,
    };
    store.tables().companies.push(company.clone());
    company
}

/// Insert a user with [`PASSWORD`] and a profile; returns the caller as the
/// gate would resolve it.
pub fn seed_user(store: &MemoryStore, company_id: Uuid, role: Role, username: &str) -> Principal {
    let now = Utc::now();
    let user = User {
        id: Uuid::now_v7(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: username.to_owned(),
        last_name: "Tester".to_owned(),
        created_at: now,
        updated_at: now,
    };
    let profile = Profile {
        id: Uuid::now_v7(),
        user_id: user.id,
        role,
        company_id: Some(company_id),
        phone_number: String::new(),
        profile_picture_key: None,
        assigned_location: "Main Office".to_owned(),
        department: "General".to_owned(),
        position: "Staff Member".to_owned(),
        date_joined: now,
        is_active: true,
        notes: String::new(),
    };
    let principal = Principal {
        user_id: user.id,
        profile_id: profile.id,
        role,
        company_id: Some(company_id),
    };
    let mut t = store.tables();
    t.users.push(StoredUser {
        user,
        password_hash: hash_password(PASSWORD).unwrap(),
    });
    t.profiles.push(profile);
    principal
}

pub fn staff_details(employee_id: &str, status: StaffStatus) -> StaffDetails {
    StaffDetails {
        employee_id: employee_id.to_owned(),
        position: "Clerk".to_owned(),
        department: "Warehouse".to_owned(),
        hire_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        salary: Some(Decimal::new(2500000, 2)),
        status,
        assigned_locations: vec!["Main Office".to_owned()],
        permissions: serde_json::json!({}),
        notes: String::new(),
    }
}

/// Seed a staff login plus employment record; returns the caller and the
/// staff record id.
pub fn seed_staff(
    store: &MemoryStore,
    company_id: Uuid,
    username: &str,
    employee_id: &str,
    status: StaffStatus,
) -> (Principal, Uuid) {
    let principal = seed_user(store, company_id, Role::Staff, username);
    let id = Uuid::now_v7();
    let now = Utc::now();
    store.tables().staff.push(StaffRecord {
        id,
        profile_id: principal.profile_id,
        details: staff_details(employee_id, status),
        created_at: now,
        updated_at: now,
    });
    (principal, id)
}

pub fn seed_product(
    store: &MemoryStore,
    company_id: Uuid,
    name: &str,
    quantity: i32,
    cost_price: Decimal,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::now_v7(),
        company_id,
        item_name: name.to_owned(),
        image_key: None,
        category: Category::Electronics,
        quantity,
        unit: Unit::Pieces,
        cost_price,
        created_at: now,
        updated_at: now,
    };
    store.tables().products.push(product.clone());
    product
}
