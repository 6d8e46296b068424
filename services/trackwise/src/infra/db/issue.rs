use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use trackwise_core::sea_ext::icontains;
use trackwise_schema::{issue_comments, issue_reports};

use super::parse_stored;
use crate::domain::repository::IssueRepository;
use crate::domain::types::{Issue, IssueComment, IssueFilter};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct DbIssueRepository {
    pub db: DatabaseConnection,
}

impl IssueRepository for DbIssueRepository {
    async fn list(&self, company_id: Uuid, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let mut query =
            issue_reports::Entity::find().filter(issue_reports::Column::CompanyId.eq(company_id));
        if let Some(status) = filter.status {
            query = query.filter(issue_reports::Column::Status.eq(status.as_str()));
        }
        if let Some(issue_type) = filter.issue_type {
            query = query.filter(issue_reports::Column::IssueType.eq(issue_type.as_str()));
        }
        if let Some(reporter_id) = filter.reporter_id {
            query = query.filter(issue_reports::Column::ReporterId.eq(reporter_id));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(issue_reports::Column::Title, term))
                    .add(icontains(issue_reports::Column::Description, term)),
            );
        }
        let models = query
            .order_by_desc(issue_reports::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list issues")?;
        let issues = models
            .into_iter()
            .map(issue_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(issues)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Issue>, ServiceError> {
        let model = issue_reports::Entity::find()
            .filter(issue_reports::Column::CompanyId.eq(company_id))
            .filter(issue_reports::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find issue")?;
        Ok(model.map(issue_from_model).transpose()?)
    }

    async fn create(&self, issue: &Issue) -> Result<(), ServiceError> {
        issue_reports::ActiveModel {
            id: Set(issue.id),
            company_id: Set(issue.company_id),
            reporter_id: Set(issue.reporter_id),
            title: Set(issue.title.clone()),
            description: Set(issue.description.clone()),
            issue_type: Set(issue.issue_type.as_str().to_owned()),
            priority: Set(issue.priority.as_str().to_owned()),
            status: Set(issue.status.as_str().to_owned()),
            attachment_key: Set(issue.attachment_key.clone()),
            image_key: Set(issue.image_key.clone()),
            created_at: Set(issue.created_at),
            updated_at: Set(issue.updated_at),
            resolved_at: Set(issue.resolved_at),
        }
        .insert(&self.db)
        .await
        .context("create issue")?;
        Ok(())
    }

    async fn save_status(&self, issue: &Issue) -> Result<(), ServiceError> {
        issue_reports::Entity::update_many()
            .col_expr(issue_reports::Column::Status, Expr::value(issue.status.as_str()))
            .col_expr(issue_reports::Column::UpdatedAt, Expr::value(issue.updated_at))
            .col_expr(issue_reports::Column::ResolvedAt, Expr::value(issue.resolved_at))
            .filter(issue_reports::Column::CompanyId.eq(issue.company_id))
            .filter(issue_reports::Column::Id.eq(issue.id))
            .exec(&self.db)
            .await
            .context("save issue status")?;
        Ok(())
    }

    async fn comments(&self, issue_id: Uuid) -> Result<Vec<IssueComment>, ServiceError> {
        let models = issue_comments::Entity::find()
            .filter(issue_comments::Column::IssueId.eq(issue_id))
            .order_by_asc(issue_comments::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list issue comments")?;
        Ok(models.into_iter().map(comment_from_model).collect())
    }

    async fn add_comment(&self, comment: &IssueComment) -> Result<(), ServiceError> {
        issue_comments::ActiveModel {
            id: Set(comment.id),
            issue_id: Set(comment.issue_id),
            author_id: Set(comment.author_id),
            comment: Set(comment.comment.clone()),
            is_business_owner_note: Set(comment.is_business_owner_note),
            created_at: Set(comment.created_at),
        }
        .insert(&self.db)
        .await
        .context("add issue comment")?;
        Ok(())
    }
}

fn issue_from_model(model: issue_reports::Model) -> anyhow::Result<Issue> {
    Ok(Issue {
        id: model.id,
        company_id: model.company_id,
        reporter_id: model.reporter_id,
        title: model.title,
        description: model.description,
        issue_type: parse_stored(&model.issue_type)?,
        priority: parse_stored(&model.priority)?,
        status: parse_stored(&model.status)?,
        attachment_key: model.attachment_key,
        image_key: model.image_key,
        created_at: model.created_at,
        updated_at: model.updated_at,
        resolved_at: model.resolved_at,
    })
}

fn comment_from_model(model: issue_comments::Model) -> IssueComment {
    IssueComment {
        id: model.id,
        issue_id: model.issue_id,
        author_id: model.author_id,
        comment: model.comment,
        is_business_owner_note: model.is_business_owner_note,
        created_at: model.created_at,
    }
}
