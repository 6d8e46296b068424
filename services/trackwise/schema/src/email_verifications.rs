use sea_orm::entity::prelude::*;

/// One-time email verification code issued before account creation.
/// Expires 10 minutes after `created_at`; a new request replaces all rows
/// for the email.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "email_verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub otp: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub is_used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
