use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;
use trackwise_core::error::FieldErrors;

use crate::domain::access::owner_tenant;
use crate::domain::password::{hash_password_on_pool, verify_password_on_pool};
use crate::domain::repository::{AccountRepository, CompanyRepository};
use crate::domain::types::{
    Account, Company, CompanyChanges, ProfileChanges, normalize_email, require,
    validate_email_field, validate_password,
};
use crate::error::ServiceError;
use crate::usecase::registration::DUPLICATE_EMAIL;

// ── GetAccount ───────────────────────────────────────────────────────────────

pub struct GetAccountUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> GetAccountUseCase<A> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Account, ServiceError> {
        self.accounts
            .find_account(user_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<A: AccountRepository, C: Clock> {
    pub accounts: A,
    pub clock: C,
}

impl<A: AccountRepository, C: Clock> UpdateProfileUseCase<A, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        mut changes: ProfileChanges,
    ) -> Result<Account, ServiceError> {
        changes.email = normalize_email(&changes.email);

        let mut errors = FieldErrors::new();
        validate_email_field(&changes.email, &mut errors);
        require(&changes.first_name, "first_name", &mut errors);
        require(&changes.last_name, "last_name", &mut errors);
        if !errors.contains("email")
            && self
                .accounts
                .email_taken(&changes.email, Some(actor.user_id))
                .await?
        {
            errors.add("email", DUPLICATE_EMAIL);
        }
        errors.into_result()?;

        if !self
            .accounts
            .update_profile(actor.user_id, &changes, self.clock.now())
            .await?
        {
            return Err(ServiceError::NotFound);
        }
        self.accounts
            .find_account(actor.user_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── UpdateCompany ────────────────────────────────────────────────────────────

pub struct UpdateCompanyUseCase<Co: CompanyRepository, C: Clock> {
    pub companies: Co,
    pub clock: C,
}

impl<Co: CompanyRepository, C: Clock> UpdateCompanyUseCase<Co, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        changes: CompanyChanges,
    ) -> Result<Company, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let changes = CompanyChanges {
            name: changes.name.trim().to_owned(),
            address: changes.address.trim().to_owned(),
            contact_info: changes.contact_info.trim().to_owned(),
        };
        let mut errors = FieldErrors::new();
        require(&changes.name, "name", &mut errors);
        errors.into_result()?;

        self.companies
            .update(company_id, &changes, self.clock.now())
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordUseCase<A: AccountRepository, C: Clock> {
    pub accounts: A,
    pub clock: C,
}

impl<A: AccountRepository, C: Clock> ChangePasswordUseCase<A, C> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let account = self
            .accounts
            .find_account(user_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let credentials = self
            .accounts
            .find_credentials(&account.user.username)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let mut errors = FieldErrors::new();
        if !verify_password_on_pool(current_password, &credentials.password_hash).await? {
            errors.add(
                "current_password",
                "Your old password was entered incorrectly. Please enter it again.",
            );
        }
        validate_password(new_password, "new_password", &mut errors);
        errors.into_result()?;

        let password_hash = hash_password_on_pool(new_password).await?;
        self.accounts
            .set_password_hash(user_id, &password_hash, self.clock.now())
            .await?;
        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
