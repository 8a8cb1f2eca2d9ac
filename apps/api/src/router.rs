use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};

use dispatch_cell::router::dispatch_routes;
use dispatch_cell::state::DispatchState;

pub fn create_router(state: Arc<DispatchState>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareDesk control-room API is running!" }))
        .nest("/control-room", dispatch_routes(state))
}
