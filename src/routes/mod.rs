use axum::routing::{get, patch, post};
use axum::Router;

use crate::{controllers, middleware, App};

/// Builds the base router for the Driver Leads API.
pub fn build_axum_router(app: App) -> Router {
    Router::new()
        .route("/checkout", post(controllers::checkout::start))
        .route("/webhook", post(controllers::webhook::receive))
        .route("/private-data", post(controllers::private_data::view))
        .route("/document-link", post(controllers::documents::issue_link))
        .route(
            "/drivers",
            get(controllers::drivers::list).post(controllers::drivers::register),
        )
        .route("/drivers/:id", get(controllers::drivers::get))
        .route("/drivers/:id/status", patch(controllers::drivers::update_status))
        .route(
            "/admin/driver",
            post(controllers::admin::create_driver).delete(controllers::admin::delete_driver),
        )
        .route("/admin/driver/cdl", post(controllers::admin::upload_cdl))
        .layer(axum::middleware::from_fn_with_state(
            app.clone(),
            middleware::auth::catch_token,
        ))
        .with_state(app)
}
