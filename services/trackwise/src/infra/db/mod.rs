//! sea-orm implementations of the repository ports.

mod account;
mod issue;
mod otp;
mod product;
mod staff;

use std::str::FromStr;

use anyhow::Context as _;

pub use account::{DbAccessRepository, DbAccountRepository, DbCompanyRepository};
pub use issue::DbIssueRepository;
pub use otp::DbOtpRepository;
pub use product::DbProductRepository;
pub use staff::DbStaffRepository;

/// Parse an enum column stored as its wire string.
fn parse_stored<T>(value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("unexpected stored value {value:?}"))
}
