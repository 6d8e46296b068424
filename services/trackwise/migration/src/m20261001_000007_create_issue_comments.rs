use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IssueComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssueComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IssueComments::IssueId).uuid().not_null())
                    .col(ColumnDef::new(IssueComments::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(IssueComments::Comment).text().not_null())
                    .col(
                        ColumnDef::new(IssueComments::IsBusinessOwnerNote)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IssueComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IssueComments::Table, IssueComments::IssueId)
                            .to(IssueReports::Table, IssueReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IssueComments::Table, IssueComments::AuthorId)
                            .to(UserProfiles::Table, UserProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(IssueComments::Table)
                    .col(IssueComments::IssueId)
                    .name("idx_issue_comments_issue_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IssueComments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IssueComments {
    Table,
    Id,
    IssueId,
    AuthorId,
    Comment,
    IsBusinessOwnerNote,
    CreatedAt,
}

#[derive(Iden)]
enum IssueReports {
    Table,
    Id,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
}
