use trackwise::domain::password::verify_password;
use trackwise::domain::types::{CompanyChanges, ProfileChanges};
use trackwise::error::ServiceError;
use trackwise::usecase::profile::{
    ChangePasswordUseCase, GetAccountUseCase, UpdateCompanyUseCase, UpdateProfileUseCase,
};
use trackwise::usecase::registration::DUPLICATE_EMAIL;
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;
use trackwise_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, PASSWORD, seed_company, seed_staff, seed_user};

fn changes(email: &str) -> ProfileChanges {
    ProfileChanges {
        email: email.to_owned(),
        first_name: "Maria".to_owned(),
        last_name: "Reyes".to_owned(),
        phone_number: "0917 555 0101".to_owned(),
        assigned_location: "Head Office".to_owned(),
        department: "Management".to_owned(),
        position: "Owner".to_owned(),
        profile_picture_key: Some("avatars/maria.png".to_owned()),
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_own_profile() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");

    let account = UpdateProfileUseCase {
        accounts: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&owner, changes(" Maria.Reyes@Acme.ph "))
    .await
    .unwrap();

    assert_eq!(account.user.email, "maria.reyes@acme.ph");
    assert_eq!(account.user.full_name(), "Maria Reyes");
    let profile = account.profile.unwrap();
    assert_eq!(profile.assigned_location, "Head Office");
    assert_eq!(profile.profile_picture_key.as_deref(), Some("avatars/maria.png"));
    assert_eq!(account.company.unwrap().id, company.id);
}

#[tokio::test]
async fn should_keep_own_email_but_reject_anothers() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    seed_user(&store, company.id, Role::Staff, "juan");
    let usecase = UpdateProfileUseCase {
        accounts: store.clone(),
        clock: ManualClock::starting_now(),
    };

    usecase.execute(&owner, changes("maria@example.com")).await.unwrap();

    let err = usecase
        .execute(&owner, changes("juan@example.com"))
        .await
        .unwrap_err();
    match err {
        ServiceError::Validation(f) => {
            assert_eq!(f.get("email"), Some(&[DUPLICATE_EMAIL.to_owned()][..]))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_load_account_page() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);

    let account = GetAccountUseCase {
        accounts: store.clone(),
    }
    .execute(staff.user_id)
    .await
    .unwrap();

    assert_eq!(account.user.username, "juan");
    assert_eq!(account.profile.unwrap().role, Role::Staff);
    assert_eq!(account.company.unwrap().name, "Acme");
}

// ── Company ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_only_owner_edit_company() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let usecase = UpdateCompanyUseCase {
        companies: store.clone(),
        clock: ManualClock::starting_now(),
    };
    let edit = CompanyChanges {
        name: " Acme Holdings ".to_owned(),
        address: "Ortigas".to_owned(),
        contact_info: "02 8000 0000".to_owned(),
    };

    let err = usecase.execute(&staff, edit.clone()).await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let updated = usecase.execute(&owner, edit).await.unwrap();
    assert_eq!(updated.name, "Acme Holdings");
    assert_eq!(store.tables().companies[0].address, "Ortigas");
}

#[tokio::test]
async fn should_require_company_name() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");

    let err = UpdateCompanyUseCase {
        companies: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(
        &owner,
        CompanyChanges {
            name: "  ".to_owned(),
            address: String::new(),
            contact_info: String::new(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(f) if f.contains("name")));
    assert_eq!(store.tables().companies[0].name, "Acme");
}

// ── Password ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_after_checking_current() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let usecase = ChangePasswordUseCase {
        accounts: store.clone(),
        clock: ManualClock::starting_now(),
    };

    let err = usecase
        .execute(owner.user_id, "not-my-password", "brand-new-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(f) if f.contains("current_password")));

    let err = usecase
        .execute(owner.user_id, PASSWORD, "short")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(f) if f.contains("new_password")));

    usecase
        .execute(owner.user_id, PASSWORD, "brand-new-secret")
        .await
        .unwrap();
    let hash = store.tables().users[0].password_hash.clone();
    assert!(verify_password("brand-new-secret", &hash).unwrap());
    assert!(!verify_password(PASSWORD, &hash).unwrap());
}
