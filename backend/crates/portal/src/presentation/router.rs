//! Portal Router

use auth::domain::repository::{IdentityProvider, ProfileRepository};
use auth::guarded;
use auth::middleware::RouteGuard;
use auth::models::Route;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;

use crate::application::config::PortalConfig;
use crate::domain::classifier::ImageClassifier;
use crate::domain::navigation::allowed_roles;
use crate::infra::SimulatedClassifier;
use crate::presentation::handlers::{self, PortalAppState};

/// Report bodies carry a base64 photo
const REPORT_BODY_LIMIT: usize = 16 * 1024 * 1024;

const DASHBOARD_ROUTES: [Route; 3] = [
    Route::Dashboard,
    Route::MunicipalDashboard,
    Route::AdminDashboard,
];

const PLACEHOLDER_ROUTES: [Route; 8] = [
    Route::MyReports,
    Route::AssignedIssues,
    Route::LiveMap,
    Route::Analytics,
    Route::Users,
    Route::Notifications,
    Route::Settings,
    Route::Profile,
];

/// Create the portal router with the simulated classifier
pub fn portal_router<B>(config: PortalConfig, settle_timeout: Duration) -> Router
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    let classifier = SimulatedClassifier::new(config.classification_latency);
    portal_router_generic::<B, _>(classifier, config, settle_timeout)
}

/// Create a portal router for any classifier implementation.
/// Needs `auth::with_client_context` applied on the composed router.
pub fn portal_router_generic<B, C>(
    classifier: C,
    config: PortalConfig,
    settle_timeout: Duration,
) -> Router
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
    C: ImageClassifier + Send + Sync + 'static,
{
    let state = PortalAppState {
        classifier: Arc::new(classifier),
        config: Arc::new(config),
    };
    let guard = |route: Route| RouteGuard::new(allowed_roles(route), settle_timeout);

    let dashboards = DASHBOARD_ROUTES.into_iter().fold(Router::new(), |router, route| {
        router.merge(guarded::<B>(
            Router::new().route(route.path(), get(handlers::dashboard)),
            guard(route),
        ))
    });

    let placeholders = PLACEHOLDER_ROUTES
        .into_iter()
        .fold(Router::new(), |router, route| {
            router.merge(guarded::<B>(
                Router::new().route(route.path(), get(handlers::placeholder)),
                guard(route),
            ))
        });

    let report = guarded::<B>(
        Router::new()
            .route(
                Route::ReportIssue.path(),
                get(handlers::report_page).post(handlers::submit_report::<C>),
            )
            .route("/report-issue/classify", post(handlers::classify::<C>))
            .layer(DefaultBodyLimit::max(REPORT_BODY_LIMIT))
            .with_state(state),
        guard(Route::ReportIssue),
    );

    Router::new()
        .route(Route::Index.path(), get(handlers::index))
        .merge(dashboards)
        .merge(placeholders)
        .merge(report)
}
