use chrono::{DateTime, Utc};
use uuid::Uuid;

use trackwise_core::clock::Clock;
use trackwise_core::error::FieldErrors;
use trackwise_domain::role::Role;

use crate::domain::password::hash_password_on_pool;
use crate::domain::repository::{AccountRepository, CompanyRepository, OtpRepository};
use crate::domain::types::{
    Company, DEFAULT_LOCATION, NewAccount, OWNER_PROFILE_DEFAULTS, Profile, ProfileDefaults,
    STAFF_PROFILE_DEFAULTS, User, normalize_email, require, validate_email_field,
    validate_password, validate_username,
};
use crate::error::ServiceError;

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";
pub const DUPLICATE_EMAIL: &str = "This email is already registered";

/// Fields shared by both registration forms.
#[derive(Debug, Clone)]
pub struct SignupFields {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl SignupFields {
    fn normalized(&self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            email: normalize_email(&self.email),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            phone_number: self.phone_number.trim().to_owned(),
        }
    }
}

/// Record field errors for a new login, including uniqueness.
pub(crate) async fn check_signup_fields<A: AccountRepository>(
    accounts: &A,
    fields: &SignupFields,
    errors: &mut FieldErrors,
) -> Result<(), ServiceError> {
    validate_username(&fields.username, errors);
    validate_email_field(&fields.email, errors);
    validate_password(&fields.password, "password", errors);
    require(&fields.first_name, "first_name", errors);
    require(&fields.last_name, "last_name", errors);

    if !errors.contains("username") && accounts.username_taken(&fields.username).await? {
        errors.add("username", DUPLICATE_USERNAME);
    }
    if !errors.contains("email") && accounts.email_taken(&fields.email, None).await? {
        errors.add("email", DUPLICATE_EMAIL);
    }
    Ok(())
}

pub(crate) fn new_user(fields: &SignupFields, now: DateTime<Utc>) -> User {
    User {
        id: Uuid::now_v7(),
        username: fields.username.clone(),
        email: fields.email.clone(),
        first_name: fields.first_name.clone(),
        last_name: fields.last_name.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn new_profile(
    user: &User,
    role: Role,
    company_id: Uuid,
    phone_number: &str,
    defaults: ProfileDefaults,
    now: DateTime<Utc>,
) -> Profile {
    Profile {
        id: Uuid::now_v7(),
        user_id: user.id,
        role,
        company_id: Some(company_id),
        phone_number: phone_number.to_owned(),
        profile_picture_key: None,
        assigned_location: DEFAULT_LOCATION.to_owned(),
        department: defaults.department.to_owned(),
        position: defaults.position.to_owned(),
        date_joined: now,
        is_active: true,
        notes: defaults.notes.to_owned(),
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registered {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub role: Role,
    pub company_id: Uuid,
    pub created_company: bool,
}

// ── RegisterOwner ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum CompanyChoice {
    New {
        name: String,
        address: String,
        contact_info: String,
    },
    Existing(Option<Uuid>),
}

#[derive(Debug, Clone)]
pub struct OwnerSignup {
    pub fields: SignupFields,
    pub company: CompanyChoice,
}

pub struct RegisterOwnerUseCase<A, Co, O, C>
where
    A: AccountRepository,
    Co: CompanyRepository,
    O: OtpRepository,
    C: Clock,
{
    pub accounts: A,
    pub companies: Co,
    pub otps: O,
    pub clock: C,
}

impl<A, Co, O, C> RegisterOwnerUseCase<A, Co, O, C>
where
    A: AccountRepository,
    Co: CompanyRepository,
    O: OtpRepository,
    C: Clock,
{
    pub async fn execute(&self, input: OwnerSignup) -> Result<Registered, ServiceError> {
        let fields = input.fields.normalized();

        // 1. The email must have passed verification.
        if !self.otps.has_verified(&fields.email).await? {
            return Err(ServiceError::VerificationRequired);
        }

        // 2. Field validation, company choice included.
        let mut errors = FieldErrors::new();
        check_signup_fields(&self.accounts, &fields, &mut errors).await?;
        match &input.company {
            CompanyChoice::New { name, .. } if name.trim().is_empty() => errors.add(
                "new_company_name",
                "Company name is required when creating a new company.",
            ),
            CompanyChoice::Existing(None) => {
                errors.add("existing_company", "Please select an existing company.")
            }
            _ => {}
        }
        errors.into_result()?;

        // 3. Resolve the company.
        let now = self.clock.now();
        let (company_id, new_company) = match input.company {
            CompanyChoice::New {
                name,
                address,
                contact_info,
            } => {
                let company = Company {
                    id: Uuid::now_v7(),
                    name: name.trim().to_owned(),
                    address: address.trim().to_owned(),
                    contact_info: contact_info.trim().to_owned(),
                    created_at: now,
                    updated_at: now,
                };
                (company.id, Some(company))
            }
            CompanyChoice::Existing(id) => {
                let id = id.ok_or(ServiceError::NotFound)?;
                let company = self
                    .companies
                    .find(id)
                    .await?
                    .ok_or(ServiceError::NotFound)?;
                (company.id, None)
            }
        };

        // 4. Persist company, user and profile; consume the verification.
        let user = new_user(&fields, now);
        let profile = new_profile(
            &user,
            Role::BusinessOwner,
            company_id,
            &fields.phone_number,
            OWNER_PROFILE_DEFAULTS,
            now,
        );
        let registered = Registered {
            user_id: user.id,
            profile_id: profile.id,
            role: Role::BusinessOwner,
            company_id,
            created_company: new_company.is_some(),
        };
        self.accounts
            .create_account(&NewAccount {
                user,
                password_hash: hash_password_on_pool(&fields.password).await?,
                profile,
                new_company,
            })
            .await?;

        tracing::info!(
            user_id = %registered.user_id,
            company_id = %company_id,
            created_company = registered.created_company,
            "business owner registered"
        );
        Ok(registered)
    }
}

// ── RegisterStaff ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StaffSignup {
    pub fields: SignupFields,
    pub company_id: Option<Uuid>,
}

pub struct RegisterStaffUseCase<A, Co, O, C>
where
    A: AccountRepository,
    Co: CompanyRepository,
    O: OtpRepository,
    C: Clock,
{
    pub accounts: A,
    pub companies: Co,
    pub otps: O,
    pub clock: C,
}

impl<A, Co, O, C> RegisterStaffUseCase<A, Co, O, C>
where
    A: AccountRepository,
    Co: CompanyRepository,
    O: OtpRepository,
    C: Clock,
{
    pub async fn execute(&self, input: StaffSignup) -> Result<Registered, ServiceError> {
        let fields = input.fields.normalized();

        // 1. The email must have passed verification.
        if !self.otps.has_verified(&fields.email).await? {
            return Err(ServiceError::VerificationRequired);
        }

        // 2. Field validation.
        let mut errors = FieldErrors::new();
        check_signup_fields(&self.accounts, &fields, &mut errors).await?;
        if input.company_id.is_none() {
            errors.add("company", "Please select your company.");
        }
        errors.into_result()?;

        // 3. The company must exist.
        let company_id = input.company_id.ok_or(ServiceError::NotFound)?;
        let company = self
            .companies
            .find(company_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        // 4. Persist.
        let now = self.clock.now();
        let user = new_user(&fields, now);
        let profile = new_profile(
            &user,
            Role::Staff,
            company.id,
            &fields.phone_number,
            STAFF_PROFILE_DEFAULTS,
            now,
        );
        let registered = Registered {
            user_id: user.id,
            profile_id: profile.id,
            role: Role::Staff,
            company_id: company.id,
            created_company: false,
        };
        self.accounts
            .create_account(&NewAccount {
                user,
                password_hash: hash_password_on_pool(&fields.password).await?,
                profile,
                new_company: None,
            })
            .await?;

        tracing::info!(user_id = %registered.user_id, company_id = %company.id, "staff registered");
        Ok(registered)
    }
}

// ── Availability checks ──────────────────────────────────────────────────────

pub struct CheckAvailabilityUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CheckAvailabilityUseCase<A> {
    pub async fn email_available(&self, raw_email: &str) -> Result<bool, ServiceError> {
        let email = normalize_email(raw_email);
        if email.is_empty() {
            return Ok(false);
        }
        Ok(!self.accounts.email_taken(&email, None).await?)
    }

    pub async fn username_available(&self, username: &str) -> Result<bool, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(false);
        }
        Ok(!self.accounts.username_taken(username).await?)
    }
}

// ── ListCompanies ────────────────────────────────────────────────────────────

pub struct ListCompaniesUseCase<Co: CompanyRepository> {
    pub companies: Co,
}

impl<Co: CompanyRepository> ListCompaniesUseCase<Co> {
    pub async fn execute(&self) -> Result<Vec<Company>, ServiceError> {
        self.companies.list().await
    }
}
