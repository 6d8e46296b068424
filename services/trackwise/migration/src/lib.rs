pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_companies;
mod m20261001_000002_create_users;
mod m20261001_000003_create_user_profiles;
mod m20261001_000004_create_staff_profiles;
mod m20261001_000005_create_products;
mod m20261001_000006_create_issue_reports;
mod m20261001_000007_create_issue_comments;
mod m20261001_000008_create_email_verifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_companies::Migration),
            Box::new(m20261001_000002_create_users::Migration),
            Box::new(m20261001_000003_create_user_profiles::Migration),
            Box::new(m20261001_000004_create_staff_profiles::Migration),
            Box::new(m20261001_000005_create_products::Migration),
            Box::new(m20261001_000006_create_issue_reports::Migration),
            Box::new(m20261001_000007_create_issue_comments::Migration),
            Box::new(m20261001_000008_create_email_verifications::Migration),
        ]
    }
}
