use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::UserProfileId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::EmployeeId)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::Position)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::Department)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffProfiles::HireDate).date().not_null())
                    .col(ColumnDef::new(StaffProfiles::Salary).decimal_len(10, 2))
                    .col(
                        ColumnDef::new(StaffProfiles::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::AssignedLocations)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::Permissions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffProfiles::Table, StaffProfiles::UserProfileId)
                            .to(UserProfiles::Table, UserProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StaffProfiles {
    Table,
    Id,
    UserProfileId,
    EmployeeId,
    Position,
    Department,
    HireDate,
    Salary,
    Status,
    AssignedLocations,
    Permissions,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
}
