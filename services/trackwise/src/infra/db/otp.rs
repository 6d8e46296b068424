use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use trackwise_schema::email_verifications;

use crate::domain::repository::OtpRepository;
use crate::domain::types::OtpRecord;
use crate::error::ServiceError;

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    email_verifications::Entity::delete_many()
                        .filter(email_verifications::Column::Email.eq(record.email.as_str()))
                        .exec(txn)
                        .await?;
                    email_verifications::ActiveModel {
                        id: Set(record.id),
                        email: Set(record.email),
                        otp: Set(record.code),
                        created_at: Set(record.created_at),
                        is_used: Set(false),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace verification code")?;
        Ok(())
    }

    async fn latest_unused(&self, email: &str) -> Result<Option<OtpRecord>, ServiceError> {
        let model = email_verifications::Entity::find()
            .filter(email_verifications::Column::Email.eq(email))
            .filter(email_verifications::Column::IsUsed.eq(false))
            .order_by_desc(email_verifications::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest unused verification code")?;
        Ok(model.map(otp_from_model))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        email_verifications::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete verification code")?;
        Ok(())
    }

    async fn mark_used(&self, id: Uuid, email: &str) -> Result<(), ServiceError> {
        let email = email.to_owned();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    email_verifications::Entity::update_many()
                        .col_expr(email_verifications::Column::IsUsed, Expr::value(true))
                        .filter(email_verifications::Column::Id.eq(id))
                        .exec(txn)
                        .await?;
                    email_verifications::Entity::delete_many()
                        .filter(email_verifications::Column::Email.eq(email.as_str()))
                        .filter(email_verifications::Column::IsUsed.eq(false))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .context("mark verification code used")?;
        Ok(())
    }

    async fn has_verified(&self, email: &str) -> Result<bool, ServiceError> {
        let count = email_verifications::Entity::find()
            .filter(email_verifications::Column::Email.eq(email))
            .filter(email_verifications::Column::IsUsed.eq(true))
            .count(&self.db)
            .await
            .context("count verified codes")?;
        Ok(count > 0)
    }
}

fn otp_from_model(model: email_verifications::Model) -> OtpRecord {
    OtpRecord {
        id: model.id,
        email: model.email,
        code: model.otp,
        created_at: model.created_at,
        is_used: model.is_used,
    }
}
