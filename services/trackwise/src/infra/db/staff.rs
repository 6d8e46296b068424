use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, TransactionTrait,
    prelude::{Decimal, Json},
    sea_query::Expr,
};
use uuid::Uuid;

use trackwise_core::sea_ext::icontains;
use trackwise_domain::staff::StaffStatus;
use trackwise_schema::{staff_profiles, user_profiles, users};

use super::account::{insert_profile, insert_user};
use super::parse_stored;
use crate::domain::repository::StaffRepository;
use crate::domain::types::{
    NewStaff, StaffChanges, StaffDetails, StaffFilter, StaffMember, join_locations,
    split_locations,
};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct DbStaffRepository {
    pub db: DatabaseConnection,
}

/// Staff record flattened with the columns it needs from profile and user.
#[derive(Debug, FromQueryResult)]
struct StaffRow {
    id: Uuid,
    user_profile_id: Uuid,
    employee_id: String,
    position: String,
    department: String,
    hire_date: NaiveDate,
    salary: Option<Decimal>,
    status: String,
    assigned_locations: String,
    permissions: Json,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Uuid,
    phone_number: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl DbStaffRepository {
    fn scoped(company_id: Uuid) -> Select<staff_profiles::Entity> {
        staff_profiles::Entity::find()
            .select_only()
            .columns([
                staff_profiles::Column::Id,
                staff_profiles::Column::UserProfileId,
                staff_profiles::Column::EmployeeId,
                staff_profiles::Column::Position,
                staff_profiles::Column::Department,
                staff_profiles::Column::HireDate,
                staff_profiles::Column::Salary,
                staff_profiles::Column::Status,
                staff_profiles::Column::AssignedLocations,
                staff_profiles::Column::Permissions,
                staff_profiles::Column::Notes,
                staff_profiles::Column::CreatedAt,
                staff_profiles::Column::UpdatedAt,
            ])
            .column_as(user_profiles::Column::UserId, "user_id")
            .column_as(user_profiles::Column::PhoneNumber, "phone_number")
            .column_as(users::Column::Username, "username")
            .column_as(users::Column::FirstName, "first_name")
            .column_as(users::Column::LastName, "last_name")
            .column_as(users::Column::Email, "email")
            .join(JoinType::InnerJoin, staff_profiles::Relation::UserProfile.def())
            .join(JoinType::InnerJoin, user_profiles::Relation::User.def())
            .filter(user_profiles::Column::CompanyId.eq(company_id))
    }

    async fn find_row(&self, company_id: Uuid, id: Uuid) -> anyhow::Result<Option<StaffRow>> {
        Self::scoped(company_id)
            .filter(staff_profiles::Column::Id.eq(id))
            .into_model::<StaffRow>()
            .one(&self.db)
            .await
            .context("find staff member")
    }
}

impl StaffRepository for DbStaffRepository {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &StaffFilter,
    ) -> Result<Vec<StaffMember>, ServiceError> {
        let mut query = Self::scoped(company_id);
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains((users::Entity, users::Column::FirstName), term))
                    .add(icontains((users::Entity, users::Column::LastName), term))
                    .add(icontains((users::Entity, users::Column::Email), term))
                    .add(icontains(
                        (staff_profiles::Entity, staff_profiles::Column::EmployeeId),
                        term,
                    ))
                    .add(icontains(
                        (staff_profiles::Entity, staff_profiles::Column::Position),
                        term,
                    ))
                    .add(icontains(
                        (staff_profiles::Entity, staff_profiles::Column::Department),
                        term,
                    )),
            );
        }
        if let Some(department) = filter
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            query = query.filter(icontains(
                (staff_profiles::Entity, staff_profiles::Column::Department),
                department,
            ));
        }
        if let Some(status) = filter.status {
            query = query.filter(staff_profiles::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_desc(staff_profiles::Column::CreatedAt)
            .into_model::<StaffRow>()
            .all(&self.db)
            .await
            .context("list staff")?;
        let members = rows
            .into_iter()
            .map(|row| staff_from_row(row, company_id))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(members)
    }

    async fn find(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<StaffMember>, ServiceError> {
        let row = self.find_row(company_id, id).await?;
        Ok(row.map(|r| staff_from_row(r, company_id)).transpose()?)
    }

    async fn employee_id_taken(
        &self,
        employee_id: &str,
        except: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let mut query = staff_profiles::Entity::find()
            .filter(staff_profiles::Column::EmployeeId.eq(employee_id));
        if let Some(id) = except {
            query = query.filter(staff_profiles::Column::Id.ne(id));
        }
        let count = query
            .count(&self.db)
            .await
            .context("count staff by employee id")?;
        Ok(count > 0)
    }

    async fn create(&self, staff: &NewStaff) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let staff = staff.clone();
                Box::pin(async move {
                    insert_user(txn, &staff.user, &staff.password_hash).await?;
                    insert_profile(txn, &staff.profile).await?;
                    let details = &staff.details;
                    staff_profiles::ActiveModel {
                        id: Set(staff.staff_id),
                        user_profile_id: Set(staff.profile.id),
                        employee_id: Set(details.employee_id.clone()),
                        position: Set(details.position.clone()),
                        department: Set(details.department.clone()),
                        hire_date: Set(details.hire_date),
                        salary: Set(details.salary),
                        status: Set(details.status.as_str().to_owned()),
                        assigned_locations: Set(join_locations(&details.assigned_locations)),
                        permissions: Set(details.permissions.clone()),
                        notes: Set(details.notes.clone()),
                        created_at: Set(staff.profile.date_joined),
                        updated_at: Set(staff.profile.date_joined),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create staff member")?;
        Ok(())
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        changes: &StaffChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<StaffMember>, ServiceError> {
        let Some(row) = self.find_row(company_id, id).await? else {
            return Ok(None);
        };
        let (user_id, profile_id) = (row.user_id, row.user_profile_id);
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let details = &changes.details;
                    users::Entity::update_many()
                        .col_expr(users::Column::FirstName, Expr::value(changes.first_name.clone()))
                        .col_expr(users::Column::LastName, Expr::value(changes.last_name.clone()))
                        .col_expr(users::Column::Email, Expr::value(changes.email.clone()))
                        .col_expr(users::Column::UpdatedAt, Expr::value(now))
                        .filter(users::Column::Id.eq(user_id))
                        .exec(txn)
                        .await?;
                    user_profiles::Entity::update_many()
                        .col_expr(
                            user_profiles::Column::PhoneNumber,
                            Expr::value(changes.phone_number.clone()),
                        )
                        .col_expr(
                            user_profiles::Column::AssignedLocation,
                            Expr::value(details.primary_location()),
                        )
                        .col_expr(
                            user_profiles::Column::Department,
                            Expr::value(details.department.clone()),
                        )
                        .col_expr(
                            user_profiles::Column::Position,
                            Expr::value(details.position.clone()),
                        )
                        .col_expr(user_profiles::Column::UpdatedAt, Expr::value(now))
                        .filter(user_profiles::Column::Id.eq(profile_id))
                        .exec(txn)
                        .await?;
                    staff_profiles::ActiveModel {
                        id: Set(id),
                        employee_id: Set(details.employee_id.clone()),
                        position: Set(details.position.clone()),
                        department: Set(details.department.clone()),
                        hire_date: Set(details.hire_date),
                        salary: Set(details.salary),
                        status: Set(details.status.as_str().to_owned()),
                        assigned_locations: Set(join_locations(&details.assigned_locations)),
                        permissions: Set(details.permissions.clone()),
                        notes: Set(details.notes.clone()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("update staff member")?;
        self.find(company_id, id).await
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let Some(row) = self.find_row(company_id, id).await? else {
            return Ok(false);
        };
        // Profile and staff rows cascade from the user.
        let result = users::Entity::delete_by_id(row.user_id)
            .exec(&self.db)
            .await
            .context("delete staff user")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_status(
        &self,
        company_id: Uuid,
        id: Uuid,
        status: StaffStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        if self.find_row(company_id, id).await?.is_none() {
            return Ok(false);
        }
        let result = staff_profiles::Entity::update_many()
            .col_expr(staff_profiles::Column::Status, Expr::value(status.as_str()))
            .col_expr(staff_profiles::Column::UpdatedAt, Expr::value(now))
            .filter(staff_profiles::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set staff status")?;
        Ok(result.rows_affected > 0)
    }

}

fn staff_from_row(row: StaffRow, company_id: Uuid) -> anyhow::Result<StaffMember> {
    Ok(StaffMember {
        id: row.id,
        user_id: row.user_id,
        profile_id: row.user_profile_id,
        company_id,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        phone_number: row.phone_number,
        details: StaffDetails {
            employee_id: row.employee_id,
            position: row.position,
            department: row.department,
            hire_date: row.hire_date,
            salary: row.salary,
            status: parse_stored(&row.status)?,
            assigned_locations: split_locations(&row.assigned_locations),
            permissions: row.permissions,
            notes: row.notes,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
