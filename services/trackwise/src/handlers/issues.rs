use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_domain::issue::{IssuePriority, IssueStatus, IssueType};

use crate::domain::types::{Issue, IssueComment, IssueFilter, IssueStatusCounts};
use crate::error::ServiceError;
use crate::handlers::{non_blank, parse_choice, parse_query};
use crate::state::AppState;
use crate::usecase::issue::{
    AddCommentUseCase, CreateIssueUseCase, GetIssueUseCase, IssueInput, IssueListing,
    ListIssuesUseCase, UpdateIssueStatusUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct IssueResponse {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub attachment_key: Option<String>,
    pub image_key: Option<String>,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "trackwise_core::serde::opt_to_rfc3339_ms")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Issue> for IssueResponse {
    fn from(i: Issue) -> Self {
        Self {
            id: i.id,
            reporter_id: i.reporter_id,
            title: i.title,
            description: i.description,
            issue_type: i.issue_type,
            priority: i.priority,
            status: i.status,
            attachment_key: i.attachment_key,
            image_key: i.image_key,
            created_at: i.created_at,
            updated_at: i.updated_at,
            resolved_at: i.resolved_at,
        }
    }
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub comment: String,
    pub is_business_owner_note: bool,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<IssueComment> for CommentResponse {
    fn from(c: IssueComment) -> Self {
        Self {
            id: c.id,
            author_id: c.author_id,
            comment: c.comment,
            is_business_owner_note: c.is_business_owner_note,
            created_at: c.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct StatusCountsResponse {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub closed: u64,
}

impl From<IssueStatusCounts> for StatusCountsResponse {
    fn from(c: IssueStatusCounts) -> Self {
        Self {
            total: c.total,
            pending: c.pending,
            in_progress: c.in_progress,
            resolved: c.resolved,
            closed: c.closed,
        }
    }
}

#[derive(Serialize)]
pub struct IssueListResponse {
    pub issues: Vec<IssueResponse>,
    pub status_counts: StatusCountsResponse,
}

impl From<IssueListing> for IssueListResponse {
    fn from(listing: IssueListing) -> Self {
        Self {
            issues: listing.issues.into_iter().map(IssueResponse::from).collect(),
            status_counts: listing.counts.into(),
        }
    }
}

// ── GET /issues, GET /issues/mine ────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct IssueQuery {
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub search: Option<String>,
}

fn issue_filter(raw_query: Option<String>) -> Result<IssueFilter, ServiceError> {
    let query: IssueQuery = parse_query(raw_query)?;
    Ok(IssueFilter {
        status: parse_choice(query.status, "status")?,
        issue_type: parse_choice(query.issue_type, "issue_type")?,
        search: non_blank(query.search),
        reporter_id: None,
    })
}

pub async fn list_issues(
    State(state): State<AppState>,
    principal: Principal,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<IssueListResponse>, ServiceError> {
    let filter = issue_filter(raw_query)?;
    let usecase = ListIssuesUseCase {
        issues: state.issue_repo(),
    };
    let listing = usecase.execute(&principal, filter).await?;
    Ok(Json(listing.into()))
}

pub async fn list_my_issues(
    State(state): State<AppState>,
    principal: Principal,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<IssueListResponse>, ServiceError> {
    let filter = issue_filter(raw_query)?;
    let usecase = ListIssuesUseCase {
        issues: state.issue_repo(),
    };
    let listing = usecase.mine(&principal, filter).await?;
    Ok(Json(listing.into()))
}

// ── POST /issues ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIssueRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub issue_type: IssueType,
    #[serde(default)]
    pub priority: IssuePriority,
    pub attachment_key: Option<String>,
    pub image_key: Option<String>,
}

pub async fn create_issue(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateIssueRequest>,
) -> Result<(StatusCode, Json<IssueResponse>), ServiceError> {
    let usecase = CreateIssueUseCase {
        issues: state.issue_repo(),
        clock: state.clock(),
    };
    let issue = usecase
        .execute(
            &principal,
            IssueInput {
                title: body.title,
                description: body.description,
                issue_type: body.issue_type,
                priority: body.priority,
                attachment_key: body.attachment_key,
                image_key: body.image_key,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(issue.into())))
}

// ── GET /issues/{id} ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct IssueThreadResponse {
    #[serde(flatten)]
    pub issue: IssueResponse,
    pub comments: Vec<CommentResponse>,
}

pub async fn get_issue(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueThreadResponse>, ServiceError> {
    let usecase = GetIssueUseCase {
        issues: state.issue_repo(),
    };
    let thread = usecase.execute(&principal, id).await?;
    Ok(Json(IssueThreadResponse {
        issue: thread.issue.into(),
        comments: thread.comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

// ── POST /issues/{id}/comments ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub is_business_owner_note: bool,
}

pub async fn add_comment(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ServiceError> {
    let usecase = AddCommentUseCase {
        issues: state.issue_repo(),
        clock: state.clock(),
    };
    let comment = usecase
        .execute(&principal, id, &body.comment, body.is_business_owner_note)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── PUT /issues/{id}/status ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: IssueStatus,
}

pub async fn update_issue_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<IssueResponse>, ServiceError> {
    let usecase = UpdateIssueStatusUseCase {
        issues: state.issue_repo(),
        clock: state.clock(),
    };
    let issue = usecase.execute(&principal, id, body.status).await?;
    Ok(Json(issue.into()))
}
