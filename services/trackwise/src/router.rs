use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use trackwise_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::gate::{GateState, session_gate};
use crate::handlers::{
    accounts::{
        change_password, check_email, check_username, get_profile, list_companies, login, logout,
        register_business_owner, register_staff, update_company, update_profile,
    },
    dashboard::dashboard,
    health::{healthz, readyz},
    inventory::{
        create_product, decrease_stock, delete_product, get_product, increase_stock,
        list_inventory, update_product,
    },
    issues::{
        add_comment, create_issue, get_issue, list_issues, list_my_issues, update_issue_status,
    },
    otp::{send_code, verify_code},
    reports::{inventory_report, staff_report},
    staff::{
        create_staff, delete_staff, get_staff, list_staff, toggle_staff_status, update_staff,
    },
};
use crate::infra::db::DbAccessRepository;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let gate = GateState {
        access: state.access_repo(),
        jwt_secret: state.jwt_secret.clone(),
        cookies: state.cookies.clone(),
    };

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Email verification
        .route("/api/otp/send", post(send_code))
        .route("/api/otp/verify", post(verify_code))
        // Registration helpers
        .route("/api/companies", get(list_companies))
        .route("/api/check-email", get(check_email))
        .route("/api/check-username", get(check_username))
        // Accounts
        .route("/accounts/register/business-owner", post(register_business_owner))
        .route("/accounts/register/staff", post(register_staff))
        .route("/accounts/login", post(login))
        .route("/accounts/logout", post(logout))
        .route("/accounts/profile", get(get_profile).put(update_profile))
        .route("/accounts/company", put(update_company))
        .route("/accounts/password", post(change_password))
        // Dashboard
        .route("/dashboard", get(dashboard))
        // Inventory
        .route("/inventory", get(list_inventory).post(create_product))
        .route(
            "/inventory/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/inventory/{id}/increase", post(increase_stock))
        .route("/inventory/{id}/decrease", post(decrease_stock))
        // Staff
        .route("/staff", get(list_staff).post(create_staff))
        .route(
            "/staff/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
        .route("/staff/{id}/toggle-status", post(toggle_staff_status))
        // Issues
        .route("/issues", get(list_issues).post(create_issue))
        .route("/issues/mine", get(list_my_issues))
        .route("/issues/{id}", get(get_issue))
        .route("/issues/{id}/comments", post(add_comment))
        .route("/issues/{id}/status", put(update_issue_status))
        // Reports
        .route("/reports/inventory", get(inventory_report))
        .route("/reports/staff", get(staff_report))
        .layer(middleware::from_fn_with_state(gate, session_gate::<DbAccessRepository>))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
