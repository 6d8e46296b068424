use chrono::Duration;
use uuid::Uuid;

use trackwise::domain::types::IssueFilter;
use trackwise::error::ServiceError;
use trackwise::usecase::issue::{
    AddCommentUseCase, CreateIssueUseCase, GetIssueUseCase, IssueInput, ListIssuesUseCase,
    UpdateIssueStatusUseCase,
};
use trackwise_auth_types::principal::Principal;
use trackwise_domain::issue::{IssuePriority, IssueStatus, IssueType};
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;
use trackwise_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, seed_company, seed_staff, seed_user};

fn input(title: &str) -> IssueInput {
    IssueInput {
        title: title.to_owned(),
        description: "Counted 8, system says 10.".to_owned(),
        issue_type: IssueType::StockDiscrepancy,
        priority: IssuePriority::default(),
        attachment_key: Some("  ".to_owned()),
        image_key: None,
    }
}

async fn report(store: &MemoryStore, actor: &Principal, title: &str) -> Uuid {
    CreateIssueUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(actor, input(title))
    .await
    .unwrap()
    .id
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_file_pending_issue_for_reporter() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);

    let issue = CreateIssueUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&staff, input(" Shelf count off "))
    .await
    .unwrap();

    assert_eq!(issue.title, "Shelf count off");
    assert_eq!(issue.status, IssueStatus::Pending);
    assert_eq!(issue.priority, IssuePriority::Medium);
    assert_eq!(issue.reporter_id, staff.profile_id);
    assert_eq!(issue.company_id, company.id);
    assert_eq!(issue.attachment_key, None);
    assert!(issue.resolved_at.is_none());
}

#[tokio::test]
async fn should_require_title_and_description() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let mut blank = input("  ");
    blank.description = String::new();

    let err = CreateIssueUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&staff, blank)
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(f) if f.contains("title") && f.contains("description")));
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_separate_company_and_own_listings() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let (ana, _) = seed_staff(&store, company.id, "ana", "EMP-2", StaffStatus::Active);
    report(&store, &juan, "Broken scanner").await;
    report(&store, &ana, "Missing pallet").await;
    let usecase = ListIssuesUseCase {
        issues: store.clone(),
    };

    let all = usecase.execute(&juan, IssueFilter::default()).await.unwrap();
    assert_eq!(all.issues.len(), 2);
    assert_eq!(all.counts.total, 2);
    assert_eq!(all.counts.pending, 2);

    let mine = usecase.mine(&juan, IssueFilter::default()).await.unwrap();
    assert_eq!(mine.issues.len(), 1);
    assert_eq!(mine.issues[0].title, "Broken scanner");
    assert_eq!(mine.counts.pending, 1);

    let searched = usecase
        .execute(
            &juan,
            IssueFilter {
                search: Some("pallet".to_owned()),
                ..IssueFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(searched.issues.len(), 1);
    assert_eq!(searched.issues[0].reporter_id, ana.profile_id);
    assert_eq!(searched.counts.total, 1);
    assert_eq!(searched.counts.pending, 1);
}

#[tokio::test]
async fn should_count_statuses_over_filtered_issues() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    report(&store, &juan, "Broken scanner").await;
    report(&store, &juan, "Broken door").await;
    report(&store, &juan, "Missing pallet").await;
    store.tables().issues[0].status = IssueStatus::Resolved;
    let usecase = ListIssuesUseCase {
        issues: store.clone(),
    };

    let broken = usecase
        .execute(
            &juan,
            IssueFilter {
                search: Some("broken".to_owned()),
                ..IssueFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(broken.issues.len(), 2);
    assert_eq!(broken.counts.total, 2);
    assert_eq!(broken.counts.resolved, 1);
    assert_eq!(broken.counts.pending, 1);

    let pending = usecase
        .mine(
            &juan,
            IssueFilter {
                status: Some(IssueStatus::Pending),
                ..IssueFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.issues.len(), 2);
    assert_eq!(pending.counts.total, 2);
    assert_eq!(pending.counts.pending, 2);
    assert_eq!(pending.counts.resolved, 0);
}

#[tokio::test]
async fn should_hide_other_company_issues() {
    let store = MemoryStore::new();
    let acme = seed_company(&store, "Acme");
    let globex = seed_company(&store, "Globex");
    let (juan, _) = seed_staff(&store, acme.id, "juan", "EMP-1", StaffStatus::Active);
    let intruder = seed_user(&store, globex.id, Role::BusinessOwner, "hank");
    let id = report(&store, &juan, "Broken scanner").await;

    let err = GetIssueUseCase {
        issues: store.clone(),
    }
    .execute(&intruder, id)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let err = AddCommentUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&intruder, id, "hello", true)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let listing = ListIssuesUseCase {
        issues: store.clone(),
    }
    .execute(&intruder, IssueFilter::default())
    .await
    .unwrap();
    assert!(listing.issues.is_empty());
}

// ── Comments ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_only_mark_owner_notes_from_owner() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let id = report(&store, &juan, "Broken scanner").await;
    let clock = ManualClock::starting_now();
    let usecase = AddCommentUseCase {
        issues: store.clone(),
        clock: clock.clone(),
    };

    let staff_note = usecase.execute(&juan, id, "Still broken", true).await.unwrap();
    assert!(!staff_note.is_business_owner_note);
    clock.advance(Duration::seconds(5));
    let owner_note = usecase.execute(&owner, id, " Ordering a new one ", true).await.unwrap();
    assert!(owner_note.is_business_owner_note);
    assert_eq!(owner_note.comment, "Ordering a new one");

    let thread = GetIssueUseCase {
        issues: store.clone(),
    }
    .execute(&juan, id)
    .await
    .unwrap();
    let comments: Vec<&str> = thread.comments.iter().map(|c| c.comment.as_str()).collect();
    assert_eq!(comments, ["Still broken", "Ordering a new one"]);
}

#[tokio::test]
async fn should_reject_blank_comment() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let id = report(&store, &juan, "Broken scanner").await;

    let err = AddCommentUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&juan, id, "   ", false)
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(f) if f.contains("comment")));
    assert!(store.tables().comments.is_empty());
}

// ── Status ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_stamp_and_clear_resolution_time() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let id = report(&store, &juan, "Broken scanner").await;
    let clock = ManualClock::starting_now();
    let usecase = UpdateIssueStatusUseCase {
        issues: store.clone(),
        clock: clock.clone(),
    };

    clock.advance(Duration::hours(1));
    let resolved = usecase.execute(&owner, id, IssueStatus::Resolved).await.unwrap();
    let resolved_at = resolved.resolved_at.unwrap();

    clock.advance(Duration::hours(1));
    let closed = usecase.execute(&owner, id, IssueStatus::Closed).await.unwrap();
    assert_eq!(closed.resolved_at, Some(resolved_at));

    let reopened = usecase.execute(&owner, id, IssueStatus::InProgress).await.unwrap();
    assert!(reopened.resolved_at.is_none());
    assert_eq!(store.tables().issues[0].status, IssueStatus::InProgress);
    assert!(store.tables().issues[0].resolved_at.is_none());
}

#[tokio::test]
async fn should_forbid_staff_from_changing_status() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (juan, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let id = report(&store, &juan, "Broken scanner").await;

    let err = UpdateIssueStatusUseCase {
        issues: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&juan, id, IssueStatus::Closed)
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::PermissionDenied(_)));
    assert_eq!(store.tables().issues[0].status, IssueStatus::Pending);
}
