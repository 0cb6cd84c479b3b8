mod broadcast;
mod errors;
mod handlers;
mod middleware;
mod state;
mod stream;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use broadcast::{Broadcaster, Subscription};
pub use errors::HttpError;
pub use state::{DEFAULT_TOKEN_INTERVAL, HttpState};

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/events", post(handlers::post_event))
        .route("/events/recent", get(handlers::recent_events))
        .route("/events/historical", get(handlers::historical_events))
        .route("/events/filter-options", get(handlers::filter_options))
        .route("/events/grouped", get(handlers::grouped_events))
        .route(
            "/preferences/grouping",
            get(handlers::preferences_get).put(handlers::preferences_put),
        )
        .route(
            "/preferences/grouping/preset",
            post(handlers::preferences_preset),
        )
        .route("/usage/blocks", get(handlers::usage_blocks))
        .route("/usage/live", get(handlers::usage_live))
        .route("/usage/daily", get(handlers::usage_daily));

    Router::new()
        .nest("/api", api)
        .route("/stream", get(stream::stream))
        .route_layer(axum_middleware::from_fn(middleware::require_loopback_origin))
        .with_state(state)
}
