use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssueReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssueReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IssueReports::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(IssueReports::ReporterId).uuid().not_null())
                    .col(ColumnDef::new(IssueReports::Title).string_len(200).not_null())
                    .col(ColumnDef::new(IssueReports::Description).text().not_null())
                    .col(
                        ColumnDef::new(IssueReports::IssueType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssueReports::Priority)
                            .string_len(20)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(IssueReports::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(IssueReports::AttachmentKey).string())
                    .col(ColumnDef::new(IssueReports::ImageKey).string())
                    .col(
                        ColumnDef::new(IssueReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssueReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IssueReports::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(IssueReports::Table, IssueReports::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IssueReports::Table, IssueReports::ReporterId)
                            .to(UserProfiles::Table, UserProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(IssueReports::Table)
                    .col(IssueReports::CompanyId)
                    .col(IssueReports::Status)
                    .name("idx_issue_reports_company_id_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IssueReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IssueReports {
    Table,
    Id,
    CompanyId,
    ReporterId,
    Title,
    Description,
    IssueType,
    Priority,
    Status,
    AttachmentKey,
    ImageKey,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
}
