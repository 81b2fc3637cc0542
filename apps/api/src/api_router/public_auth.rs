use axum::Router;
use axum::routing::post;

use crate::auth;
use crate::state::AppState;

pub(super) fn build_login_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(auth::login_handler))
}
