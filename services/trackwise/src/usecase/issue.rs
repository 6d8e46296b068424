use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;
use trackwise_core::error::FieldErrors;
use trackwise_domain::issue::{IssuePriority, IssueStatus, IssueType};

use crate::domain::access::{owner_tenant, tenant};
use crate::domain::repository::IssueRepository;
use crate::domain::types::{Issue, IssueComment, IssueFilter, IssueStatusCounts, require};
use crate::error::ServiceError;

pub const TITLE_MAX_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct IssueInput {
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub attachment_key: Option<String>,
    pub image_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssueListing {
    pub issues: Vec<Issue>,
    pub counts: IssueStatusCounts,
}

// ── ListIssues ───────────────────────────────────────────────────────────────

pub struct ListIssuesUseCase<I: IssueRepository> {
    pub issues: I,
}

impl<I: IssueRepository> ListIssuesUseCase<I> {
    /// Company-wide listing.
    pub async fn execute(
        &self,
        actor: &Principal,
        mut filter: IssueFilter,
    ) -> Result<IssueListing, ServiceError> {
        let company_id = tenant(actor)?;
        filter.reporter_id = None;
        self.listing(company_id, &filter).await
    }

    /// Issues filed by the caller.
    pub async fn mine(
        &self,
        actor: &Principal,
        mut filter: IssueFilter,
    ) -> Result<IssueListing, ServiceError> {
        let company_id = tenant(actor)?;
        filter.reporter_id = Some(actor.profile_id);
        self.listing(company_id, &filter).await
    }

    async fn listing(
        &self,
        company_id: Uuid,
        filter: &IssueFilter,
    ) -> Result<IssueListing, ServiceError> {
        let issues = self.issues.list(company_id, filter).await?;
        let counts = IssueStatusCounts::tally(issues.iter().map(|i| i.status));
        Ok(IssueListing { issues, counts })
    }
}

// ── GetIssue ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IssueThread {
    pub issue: Issue,
    /// Oldest first.
    pub comments: Vec<IssueComment>,
}

pub struct GetIssueUseCase<I: IssueRepository> {
    pub issues: I,
}

impl<I: IssueRepository> GetIssueUseCase<I> {
    pub async fn execute(&self, actor: &Principal, id: Uuid) -> Result<IssueThread, ServiceError> {
        let company_id = tenant(actor)?;
        let issue = self
            .issues
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let comments = self.issues.comments(issue.id).await?;
        Ok(IssueThread { issue, comments })
    }
}

// ── CreateIssue ──────────────────────────────────────────────────────────────

pub struct CreateIssueUseCase<I: IssueRepository, C: Clock> {
    pub issues: I,
    pub clock: C,
}

impl<I: IssueRepository, C: Clock> CreateIssueUseCase<I, C> {
    pub async fn execute(&self, actor: &Principal, input: IssueInput) -> Result<Issue, ServiceError> {
        let company_id = tenant(actor)?;
        let title = input.title.trim().to_owned();
        let description = input.description.trim().to_owned();

        let mut errors = FieldErrors::new();
        require(&title, "title", &mut errors);
        if title.chars().count() > TITLE_MAX_LEN {
            errors.add("title", "Ensure this value has at most 200 characters.");
        }
        require(&description, "description", &mut errors);
        errors.into_result()?;

        let now = self.clock.now();
        let issue = Issue {
            id: Uuid::now_v7(),
            company_id,
            reporter_id: actor.profile_id,
            title,
            description,
            issue_type: input.issue_type,
            priority: input.priority,
            status: IssueStatus::Pending,
            attachment_key: input.attachment_key.filter(|k| !k.trim().is_empty()),
            image_key: input.image_key.filter(|k| !k.trim().is_empty()),
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.issues.create(&issue).await?;
        tracing::info!(issue_id = %issue.id, company_id = %company_id, "issue reported");
        Ok(issue)
    }
}

// ── AddComment ───────────────────────────────────────────────────────────────

pub struct AddCommentUseCase<I: IssueRepository, C: Clock> {
    pub issues: I,
    pub clock: C,
}

impl<I: IssueRepository, C: Clock> AddCommentUseCase<I, C> {
    /// The owner-note flag is only honoured for business owners.
    pub async fn execute(
        &self,
        actor: &Principal,
        issue_id: Uuid,
        comment: &str,
        owner_note: bool,
    ) -> Result<IssueComment, ServiceError> {
        let company_id = tenant(actor)?;
        let issue = self
            .issues
            .find(company_id, issue_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ServiceError::field("comment", "This field is required."));
        }

        let comment = IssueComment {
            id: Uuid::now_v7(),
            issue_id: issue.id,
            author_id: actor.profile_id,
            comment: comment.to_owned(),
            is_business_owner_note: owner_note && actor.is_owner(),
            created_at: self.clock.now(),
        };
        self.issues.add_comment(&comment).await?;
        Ok(comment)
    }
}

// ── UpdateIssueStatus ────────────────────────────────────────────────────────

pub struct UpdateIssueStatusUseCase<I: IssueRepository, C: Clock> {
    pub issues: I,
    pub clock: C,
}

impl<I: IssueRepository, C: Clock> UpdateIssueStatusUseCase<I, C> {
    pub async fn execute(
        &self,
        actor: &Principal,
        id: Uuid,
        status: IssueStatus,
    ) -> Result<Issue, ServiceError> {
        let company_id = owner_tenant(actor)?;
        let issue = self
            .issues
            .find(company_id, id)
            .await?
            .ok_or(ServiceError::NotFound)?
            .with_status(status, self.clock.now());
        self.issues.save_status(&issue).await?;
        tracing::info!(issue_id = %id, status = status.as_str(), "issue status updated");
        Ok(issue)
    }
}
