//! HTTP Handlers

use auth::application::Notification;
use auth::middleware::Viewer;
use auth::models::Route;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::classify::ClassifyImageUseCase;
use crate::application::config::PortalConfig;
use crate::application::dashboard::Dashboard;
use crate::application::shell::Shell;
use crate::application::submit_report::SubmitReportUseCase;
use crate::domain::classifier::ImageClassifier;
use crate::domain::navigation::NAV_ITEMS;
use crate::error::PortalResult;
use crate::presentation::dto::{
    ClassifyRequest, ClassifyResponse, DashboardView, IndexView, PlaceholderView, ReceiptView,
    ReportFormView, SubmitReportRequest,
};

/// Shared state for report handlers
pub struct PortalAppState<C>
where
    C: ImageClassifier + Send + Sync + 'static,
{
    pub classifier: Arc<C>,
    pub config: Arc<PortalConfig>,
}

impl<C> Clone for PortalAppState<C>
where
    C: ImageClassifier + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /
pub async fn index() -> Json<IndexView> {
    Json(IndexView::default())
}

/// GET /dashboard, /municipal-dashboard, /admin-dashboard
pub async fn dashboard(Extension(viewer): Extension<Viewer>) -> Json<DashboardView> {
    Json(DashboardView {
        view: "dashboard",
        shell: Shell::build(&viewer.profile, &viewer.path),
        dashboard: Dashboard::for_role(viewer.role()),
        notifications: viewer.notifications(),
    })
}

/// GET /report-issue
pub async fn report_page(Extension(viewer): Extension<Viewer>) -> Json<ReportFormView> {
    let shell = Shell::build(&viewer.profile, &viewer.path);
    Json(ReportFormView::new(shell, viewer.notifications()))
}

/// POST /report-issue/classify
pub async fn classify<C>(
    State(state): State<PortalAppState<C>>,
    Json(req): Json<ClassifyRequest>,
) -> PortalResult<Json<ClassifyResponse>>
where
    C: ImageClassifier + Send + Sync + 'static,
{
    let use_case = ClassifyImageUseCase::new(state.classifier.clone());
    let output = use_case.execute(&req.image).await?;
    Ok(Json(output.into()))
}

/// POST /report-issue
pub async fn submit_report<C>(
    State(state): State<PortalAppState<C>>,
    Extension(viewer): Extension<Viewer>,
    Json(req): Json<SubmitReportRequest>,
) -> Response
where
    C: ImageClassifier + Send + Sync + 'static,
{
    let use_case = SubmitReportUseCase::new(state.classifier.clone(), state.config.clone());

    match use_case.execute(req.into(), &viewer.profile.id).await {
        Ok(receipt) => {
            viewer.notify(Notification::success(
                "Report Submitted Successfully",
                "Your issue has been reported and will be reviewed by our team.",
            ));
            let view = ReceiptView::new(receipt, viewer.notifications());
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(e) => {
            e.log();
            viewer.notify(Notification::error(
                "Error submitting report",
                Some(e.user_message()),
            ));
            let shell = Shell::build(&viewer.profile, &viewer.path);
            let view = ReportFormView::new(shell, viewer.notifications());
            (e.status_code(), Json(view)).into_response()
        }
    }
}

/// Pages without content of their own yet
pub async fn placeholder(Extension(viewer): Extension<Viewer>) -> Json<PlaceholderView> {
    let title = Route::from_path(&viewer.path).map_or("Page", page_title);
    Json(PlaceholderView {
        view: "placeholder",
        title,
        shell: Shell::build(&viewer.profile, &viewer.path),
        notifications: viewer.notifications(),
    })
}

fn page_title(route: Route) -> &'static str {
    match route {
        Route::Profile => "Profile",
        route => NAV_ITEMS
            .iter()
            .find(|item| item.route == Some(route))
            .map_or("Page", |item| item.label),
    }
}
