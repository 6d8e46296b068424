use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

use trackwise::domain::access::OWNER_ONLY_MESSAGE;
use trackwise::domain::types::InventoryFilter;
use trackwise::error::ServiceError;
use trackwise::usecase::dashboard::DashboardUseCase;
use trackwise::usecase::inventory::{
    AdjustStockUseCase, CreateProductUseCase, DeleteProductUseCase, GetProductUseCase,
    ListInventoryUseCase, ProductInput, StockAdjustment, UpdateProductUseCase,
};
use trackwise_domain::pagination::{PageRequest, Sort};
use trackwise_domain::product::{Category, StockStatus};
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;
use trackwise_testing::clock::ManualClock;

use crate::helpers::{MemoryStore, seed_company, seed_product, seed_staff, seed_user};

fn input(name: &str, quantity: i64, cents: i64) -> ProductInput {
    ProductInput {
        item_name: name.to_owned(),
        image_key: None,
        category: "electronics".to_owned(),
        quantity,
        unit_of_measure: "pieces".to_owned(),
        cost_price: Decimal::new(cents, 2),
    }
}

fn adjust(store: &MemoryStore) -> AdjustStockUseCase<MemoryStore, ManualClock> {
    AdjustStockUseCase {
        products: store.clone(),
        clock: ManualClock::starting_now(),
    }
}

// ── Create / stock ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_track_value_through_stock_changes() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");

    let product = CreateProductUseCase {
        products: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&owner, input("Widget", 5, 1000))
    .await
    .unwrap();
    assert_eq!(product.total_value(), Decimal::new(5000, 2));
    assert_eq!(product.stock_status(), StockStatus::LowStock);

    let change = adjust(&store)
        .execute(&owner, product.id, StockAdjustment::Decrease)
        .await
        .unwrap();
    assert_eq!(change.product.quantity, 4);
    assert_eq!(change.product.total_value(), Decimal::new(4000, 2));
    assert_eq!(change.totals.total_inventory_value, Decimal::new(4000, 2));

    let change = adjust(&store)
        .execute(&owner, product.id, StockAdjustment::Increase)
        .await
        .unwrap();
    assert_eq!(change.product.quantity, 5);
}

#[tokio::test]
async fn should_not_decrease_below_zero() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let empty = seed_product(&store, company.id, "Cable", 0, Decimal::new(250, 2));

    let change = adjust(&store)
        .execute(&owner, empty.id, StockAdjustment::Decrease)
        .await
        .unwrap();

    assert_eq!(change.product.quantity, 0);
    assert_eq!(change.totals.out_of_stock_count, 1);
    assert_eq!(store.tables().products[0].quantity, 0);
}

#[tokio::test]
async fn should_not_increase_past_column_range() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let full = seed_product(&store, company.id, "Pallet", i32::MAX, Decimal::ZERO);

    let change = adjust(&store)
        .execute(&owner, full.id, StockAdjustment::Increase)
        .await
        .unwrap();

    assert_eq!(change.product.quantity, i32::MAX);
    assert_eq!(store.tables().products[0].updated_at, full.updated_at);
}

#[tokio::test]
async fn should_let_staff_create_and_adjust() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);

    let product = CreateProductUseCase {
        products: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&staff, input("Widget", 1, 100))
    .await
    .unwrap();
    assert_eq!(product.company_id, company.id);

    let change = adjust(&store)
        .execute(&staff, product.id, StockAdjustment::Increase)
        .await
        .unwrap();
    assert_eq!(change.product.quantity, 2);
}

#[tokio::test]
async fn should_reject_invalid_product_fields() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");

    let err = CreateProductUseCase {
        products: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&owner, input("", -3, 100))
    .await
    .unwrap_err();

    match err {
        ServiceError::Validation(f) => {
            assert!(f.contains("item_name"));
            assert!(f.contains("quantity"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(store.tables().products.is_empty());
}

// ── Owner-only edits ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_staff_from_editing_or_deleting() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let product = seed_product(&store, company.id, "Widget", 5, Decimal::new(1000, 2));

    let err = UpdateProductUseCase {
        products: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&staff, product.id, input("Gadget", 5, 1000))
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(m) if m == OWNER_ONLY_MESSAGE));

    let err = DeleteProductUseCase {
        products: store.clone(),
    }
    .execute(&staff, product.id)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
    assert_eq!(store.tables().products.len(), 1);
}

#[tokio::test]
async fn should_update_and_delete_as_owner() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let product = seed_product(&store, company.id, "Widget", 5, Decimal::new(1000, 2));
    let clock = ManualClock::starting_now();
    clock.advance(Duration::minutes(1));

    let updated = UpdateProductUseCase {
        products: store.clone(),
        clock: clock.clone(),
    }
    .execute(&owner, product.id, input("Gadget", 12, 199))
    .await
    .unwrap();
    assert_eq!(updated.item_name, "Gadget");
    assert_eq!(updated.stock_status(), StockStatus::InStock);
    assert!(updated.updated_at > product.updated_at);

    DeleteProductUseCase {
        products: store.clone(),
    }
    .execute(&owner, product.id)
    .await
    .unwrap();
    assert!(store.tables().products.is_empty());
}

// ── Tenant isolation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_hide_other_company_products() {
    let store = MemoryStore::new();
    let acme = seed_company(&store, "Acme");
    let globex = seed_company(&store, "Globex");
    let intruder = seed_user(&store, globex.id, Role::BusinessOwner, "hank");
    let product = seed_product(&store, acme.id, "Widget", 5, Decimal::new(1000, 2));

    let err = GetProductUseCase {
        products: store.clone(),
    }
    .execute(&intruder, product.id)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let err = adjust(&store)
        .execute(&intruder, product.id, StockAdjustment::Increase)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let err = DeleteProductUseCase {
        products: store.clone(),
    }
    .execute(&intruder, product.id)
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));
    assert_eq!(store.tables().products[0].quantity, 5);

    let listing = ListInventoryUseCase {
        products: store.clone(),
    }
    .execute(&intruder, InventoryFilter::default())
    .await
    .unwrap();
    assert!(listing.page.items.is_empty());
    assert_eq!(listing.totals.total_products, 0);
}

#[tokio::test]
async fn should_reject_unknown_product_id() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");

    let err = GetProductUseCase {
        products: store.clone(),
    }
    .execute(&owner, Uuid::now_v7())
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound));
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_sort_and_total_inventory() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    seed_product(&store, company.id, "Widget", 5, Decimal::new(1000, 2));
    seed_product(&store, company.id, "Wide Monitor", 20, Decimal::new(15000, 2));
    seed_product(&store, company.id, "Cable", 0, Decimal::new(250, 2));
    store.tables().products[2].category = Category::Other;
    let usecase = ListInventoryUseCase {
        products: store.clone(),
    };

    let listing = usecase
        .execute(
            &owner,
            InventoryFilter {
                search: Some("wid".to_owned()),
                cost_order: Some(Sort::Desc),
                ..InventoryFilter::default()
            },
        )
        .await
        .unwrap();
    let names: Vec<&str> = listing.page.items.iter().map(|p| p.item_name.as_str()).collect();
    assert_eq!(names, ["Wide Monitor", "Widget"]);
    assert_eq!(listing.page.total, 2);

    assert_eq!(listing.totals.total_products, 2);
    assert_eq!(listing.totals.total_inventory_value, Decimal::new(305000, 2));
    assert_eq!(listing.totals.low_stock_count, 1);
    assert_eq!(listing.totals.out_of_stock_count, 0);

    let listing = usecase
        .execute(
            &owner,
            InventoryFilter {
                category: Some(Category::Other),
                ..InventoryFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listing.page.items.len(), 1);
    assert_eq!(listing.page.items[0].item_name, "Cable");
    assert_eq!(listing.totals.total_products, 1);
    assert_eq!(listing.totals.total_inventory_value, Decimal::ZERO);
    assert_eq!(listing.totals.out_of_stock_count, 1);
}

#[tokio::test]
async fn should_total_only_the_searched_products() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    seed_product(&store, company.id, "Widget", 5, Decimal::new(1000, 2));
    seed_product(&store, company.id, "Cable", 0, Decimal::new(250, 2));

    let listing = ListInventoryUseCase {
        products: store.clone(),
    }
    .execute(
        &owner,
        InventoryFilter {
            search: Some("widget".to_owned()),
            ..InventoryFilter::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(listing.page.items.len(), 1);
    assert_eq!(listing.totals.total_products, listing.page.items.len() as u64);
    assert_eq!(listing.totals.total_inventory_value, Decimal::new(5000, 2));
    assert_eq!(listing.totals.low_stock_count, 1);
    assert_eq!(listing.totals.out_of_stock_count, 0);
}

#[tokio::test]
async fn should_paginate_listing() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    for i in 0..5 {
        seed_product(&store, company.id, &format!("Item {i}"), 1, Decimal::new(100 * (i + 1), 2));
    }

    let listing = ListInventoryUseCase {
        products: store.clone(),
    }
    .execute(
        &owner,
        InventoryFilter {
            cost_order: Some(Sort::Asc),
            page: PageRequest::new(Some(2), Some(2)),
            ..InventoryFilter::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(listing.page.total, 5);
    let names: Vec<&str> = listing.page.items.iter().map(|p| p.item_name.as_str()).collect();
    assert_eq!(names, ["Item 2", "Item 3"]);
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_show_owner_stats_only_to_owner() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    seed_staff(&store, company.id, "pedro", "EMP-2", StaffStatus::OnLeave);
    seed_product(&store, company.id, "Widget", 5, Decimal::new(1000, 2));
    seed_product(&store, company.id, "Cable", 0, Decimal::new(250, 2));
    let usecase = DashboardUseCase {
        products: store.clone(),
        companies: store.clone(),
        clock: ManualClock::starting_now(),
    };

    let dashboard = usecase.execute(&owner).await.unwrap();
    assert_eq!(dashboard.total_products, 2);
    assert_eq!(dashboard.low_stock, 1);
    assert_eq!(dashboard.out_of_stock, 1);
    assert_eq!(dashboard.recent_products.len(), 2);
    let stats = dashboard.owner.unwrap();
    assert_eq!(stats.total_staff, 2);
    assert_eq!(stats.total_inventory_value, Decimal::new(5000, 2));
    assert!(dashboard.recent_updates.is_none());

    let dashboard = usecase.execute(&staff).await.unwrap();
    assert!(dashboard.owner.is_none());
    assert_eq!(dashboard.recent_updates.unwrap().len(), 2);
}

#[tokio::test]
async fn should_count_self_registered_staff_on_dashboard() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let other = seed_company(&store, "Other Co");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    // Signed up through staff registration, so no employment record.
    seed_user(&store, company.id, Role::Staff, "lara");
    seed_user(&store, other.id, Role::Staff, "outsider");

    let dashboard = DashboardUseCase {
        products: store.clone(),
        companies: store.clone(),
        clock: ManualClock::starting_now(),
    }
    .execute(&owner)
    .await
    .unwrap();

    assert_eq!(dashboard.owner.unwrap().total_staff, 2);
}
