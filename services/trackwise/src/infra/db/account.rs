use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use trackwise_domain::role::Role;
use trackwise_schema::{companies, email_verifications, user_profiles, users};

use super::parse_stored;
use crate::domain::repository::{AccessRepository, AccountRepository, CompanyRepository};
use crate::domain::types::{
    AccessRecord, Account, Company, CompanyChanges, Credentials, NewAccount, Profile,
    ProfileChanges, User,
};
use crate::error::ServiceError;

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query.count(&self.db).await.context("count users by email")?;
        Ok(count > 0)
    }

    async fn username_taken(&self, username: &str) -> Result<bool, ServiceError> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await
            .context("count users by username")?;
        Ok(count > 0)
    }

    async fn create_account(&self, account: &NewAccount) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let account = account.clone();
                Box::pin(async move {
                    if let Some(company) = &account.new_company {
                        company_active_model(company).insert(txn).await?;
                    }
                    insert_user(txn, &account.user, &account.password_hash).await?;
                    insert_profile(txn, &account.profile).await?;
                    email_verifications::Entity::delete_many()
                        .filter(email_verifications::Column::Email.eq(account.user.email.as_str()))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .context("create account")?;
        Ok(())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<Credentials>, ServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(|m| Credentials {
            user_id: m.id,
            password_hash: m.password_hash,
        }))
    }

    async fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ServiceError> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find user by id")?
        else {
            return Ok(None);
        };
        let profile = user_profiles::Entity::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find profile by user id")?
            .map(profile_from_model)
            .transpose()?;
        let company = match profile.as_ref().and_then(|p| p.company_id) {
            Some(company_id) => companies::Entity::find_by_id(company_id)
                .one(&self.db)
                .await
                .context("find company of profile")?
                .map(company_from_model),
            None => None,
        };
        Ok(Some(Account {
            user: user_from_model(user),
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
        let updated = self
            .db
            .transaction::<_, bool, sea_orm::DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    users::Entity::update_many()
                        .col_expr(users::Column::Email, Expr::value(changes.email))
                        .col_expr(users::Column::FirstName, Expr::value(changes.first_name))
                        .col_expr(users::Column::LastName, Expr::value(changes.last_name))
                        .col_expr(users::Column::UpdatedAt, Expr::value(now))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    let result = user_profiles::Entity::update_many()
                        .col_expr(
                            user_profiles::Column::PhoneNumber,
                            Expr::value(changes.phone_number),
                        )
                        .col_expr(
                            user_profiles::Column::AssignedLocation,
                            Expr::value(changes.assigned_location),
                        )
                        .col_expr(user_profiles::Column::Department, Expr::value(changes.department))
                        .col_expr(user_profiles::Column::Position, Expr::value(changes.position))
                        .col_expr(
                            user_profiles::Column::ProfilePictureKey,
                            Expr::value(changes.profile_picture_key),
                        )
                        .col_expr(user_profiles::Column::UpdatedAt, Expr::value(now))
                        .filter(user_profiles::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .context("update profile")?;
        Ok(updated)
    }

    async fn set_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .context("set password hash")?;
        Ok(())
    }
}

pub(super) async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    user: &User,
    password_hash: &str,
) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        password_hash: Set(password_hash.to_owned()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub(super) async fn insert_profile<C: ConnectionTrait>(
    conn: &C,
    profile: &Profile,
) -> Result<(), sea_orm::DbErr> {
    user_profiles::ActiveModel {
        id: Set(profile.id),
        user_id: Set(profile.user_id),
        role: Set(profile.role.as_str().to_owned()),
        company_id: Set(profile.company_id),
        phone_number: Set(profile.phone_number.clone()),
        profile_picture_key: Set(profile.profile_picture_key.clone()),
        assigned_location: Set(profile.assigned_location.clone()),
        department: Set(profile.department.clone()),
        position: Set(profile.position.clone()),
        date_joined: Set(profile.date_joined),
        is_active: Set(profile.is_active),
        notes: Set(profile.notes.clone()),
        created_at: Set(profile.date_joined),
        updated_at: Set(profile.date_joined),
    }
    .insert(conn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn profile_from_model(model: user_profiles::Model) -> anyhow::Result<Profile> {
    Ok(Profile {
        id: model.id,
        user_id: model.user_id,
        role: parse_stored(&model.role)?,
        company_id: model.company_id,
        phone_number: model.phone_number,
        profile_picture_key: model.profile_picture_key,
        assigned_location: model.assigned_location,
        department: model.department,
        position: model.position,
        date_joined: model.date_joined,
        is_active: model.is_active,
        notes: model.notes,
    })
}

// ── Company repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCompanyRepository {
    pub db: DatabaseConnection,
}

impl CompanyRepository for DbCompanyRepository {
    async fn list(&self) -> Result<Vec<Company>, ServiceError> {
        let models = companies::Entity::find()
            .order_by_asc(companies::Column::Name)
            .all(&self.db)
            .await
            .context("list companies")?;
        Ok(models.into_iter().map(company_from_model).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Company>, ServiceError> {
        let model = companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find company by id")?;
        Ok(model.map(company_from_model))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &CompanyChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, ServiceError> {
        let Some(model) = companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find company for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.name = Set(changes.name.clone());
        am.address = Set(changes.address.clone());
        am.contact_info = Set(changes.contact_info.clone());
        am.updated_at = Set(now);
        let model = am.update(&self.db).await.context("update company")?;
        Ok(Some(company_from_model(model)))
    }

    async fn staff_count(&self, company_id: Uuid) -> Result<u64, ServiceError> {
        let count = user_profiles::Entity::find()
            .filter(user_profiles::Column::CompanyId.eq(company_id))
            .filter(user_profiles::Column::Role.eq(Role::Staff.as_str()))
            .count(&self.db)
            .await
            .context("count staff profiles")?;
        Ok(count)
    }
}

fn company_active_model(company: &Company) -> companies::ActiveModel {
    companies::ActiveModel {
        id: Set(company.id),
        name: Set(company.name.clone()),
        address: Set(company.address.clone()),
        contact_info: Set(company.contact_info.clone()),
        created_at: Set(company.created_at),
        updated_at: Set(company.updated_at),
    }
}

fn company_from_model(model: companies::Model) -> Company {
    Company {
        id: model.id,
        name: model.name,
        address: model.address,
        contact_info: model.contact_info,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Access repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccessRepository {
    pub db: DatabaseConnection,
}

impl AccessRepository for DbAccessRepository {
    async fn load_access(&self, user_id: Uuid) -> Result<Option<AccessRecord>, ServiceError> {
        let row = user_profiles::Entity::find()
            .filter(user_profiles::Column::UserId.eq(user_id))
            .find_also_related(trackwise_schema::staff_profiles::Entity)
            .one(&self.db)
            .await
            .context("load access record")?;
        let Some((profile, staff)) = row else {
            return Ok(None);
        };
        Ok(Some(AccessRecord {
            user_id,
            profile_id: profile.id,
            role: parse_stored(&profile.role)?,
            company_id: profile.company_id,
            is_active: profile.is_active,
            staff_status: staff.map(|s| parse_stored(&s.status)).transpose()?,
        }))
    }
}
