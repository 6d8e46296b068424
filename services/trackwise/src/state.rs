use sea_orm::DatabaseConnection;

use trackwise_auth_types::cookie::CookieSettings;
use trackwise_core::clock::SystemClock;

use crate::infra::db::{
    DbAccessRepository, DbAccountRepository, DbCompanyRepository, DbIssueRepository,
    DbOtpRepository, DbProductRepository, DbStaffRepository,
};
use crate::infra::mail::Mailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub cookies: CookieSettings,
    pub mailer: Mailer,
    /// Echo the verification code when email delivery failed.
    pub otp_fallback_in_response: bool,
    pub currency_symbol: String,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn company_repo(&self) -> DbCompanyRepository {
        DbCompanyRepository {
            db: self.db.clone(),
        }
    }

    pub fn access_repo(&self) -> DbAccessRepository {
        DbAccessRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn staff_repo(&self) -> DbStaffRepository {
        DbStaffRepository {
            db: self.db.clone(),
        }
    }

    pub fn issue_repo(&self) -> DbIssueRepository {
        DbIssueRepository {
            db: self.db.clone(),
        }
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}
