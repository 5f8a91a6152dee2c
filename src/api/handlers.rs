use crate::api::AppState;
use crate::error::Result;
use crate::models::*;
use crate::state::IssueFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, crate::metrics::gather_metrics())
}

/// Submit a new issue report
pub async fn submit_issue(
    State(state): State<AppState>,
    Json(report): Json<IssueReport>,
) -> Result<(StatusCode, Json<ReportAck>)> {
    let ack = state.processor.submit_report(report).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Get an issue by ID
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Issue>> {
    let issue = state.processor.get_issue(&id).await?;
    Ok(Json(issue))
}

/// List issues
pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<ListIssuesQuery>,
) -> Result<Json<ListIssuesResponse>> {
    let filter = IssueFilter {
        statuses: params.statuses.unwrap_or_default(),
        categories: params.categories.unwrap_or_default(),
        priorities: params.priorities.unwrap_or_default(),
        reporter: params.reporter,
        public_only: params.public_only.unwrap_or(false),
        open_only: params.open_only.unwrap_or(false),
    };

    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).min(100); // Max 100 per page

    let issues = state
        .processor
        .store()
        .list_issues(&filter, page, page_size)
        .await?;
    let total = state.processor.store().count_issues(&filter).await?;

    Ok(Json(ListIssuesResponse {
        issues,
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListIssuesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub statuses: Option<Vec<IssueStatus>>,
    pub categories: Option<Vec<Category>>,
    pub priorities: Option<Vec<PriorityLevel>>,
    pub reporter: Option<String>,
    pub public_only: Option<bool>,
    pub open_only: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ListIssuesResponse {
    pub issues: Vec<Issue>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Update issue status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Issue>> {
    let issue = state
        .processor
        .update_status(
            &id,
            request.status,
            request.actor.unwrap_or_else(|| "api".to_string()),
            request.notes,
        )
        .await?;

    Ok(Json(issue))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: IssueStatus,
    pub actor: Option<String>,
    pub notes: Option<String>,
}

/// Resolve an issue
pub async fn resolve_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveIssueRequest>,
) -> Result<Json<Issue>> {
    let issue = state
        .processor
        .resolve_issue(&id, request.resolved_by, request.notes)
        .await?;

    Ok(Json(issue))
}

#[derive(Debug, Deserialize)]
pub struct ResolveIssueRequest {
    pub resolved_by: String,
    pub notes: String,
}

/// Toggle an upvote
pub async fn toggle_upvote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpvoteRequest>,
) -> Result<Json<UpvoteResponse>> {
    let (issue, upvoted) = state
        .processor
        .toggle_upvote(&id, request.reporter)
        .await?;

    Ok(Json(UpvoteResponse {
        issue_id: issue.id,
        upvoted,
        upvotes: issue.upvotes.len(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpvoteRequest {
    pub reporter: String,
}

#[derive(Debug, Serialize)]
pub struct UpvoteResponse {
    pub issue_id: Uuid,
    pub upvoted: bool,
    pub upvotes: usize,
}

/// Add a comment
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Issue>)> {
    let issue = state
        .processor
        .add_comment(&id, request.author, request.text)
        .await?;

    Ok((StatusCode::CREATED, Json(issue)))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub author: String,
    pub text: String,
}

/// Re-run classification over all stored issues
pub async fn reclassify_issues(
    State(state): State<AppState>,
) -> Result<Json<ReclassifyResponse>> {
    let processed = state.processor.reclassify_all().await?;
    Ok(Json(ReclassifyResponse { processed }))
}

#[derive(Debug, Serialize)]
pub struct ReclassifyResponse {
    pub processed: usize,
}

/// Overall analytics summary
pub async fn analytics_summary(
    State(state): State<AppState>,
) -> Result<Json<crate::analytics::OverallStats>> {
    let stats = state.analytics.overall_stats().await?;
    Ok(Json(stats))
}

/// Daily activity report
pub async fn analytics_daily(
    State(state): State<AppState>,
    Query(params): Query<DailyQuery>,
) -> Result<Json<crate::analytics::DailyReport>> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let report = state.analytics.daily_report(date).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

/// Geographic heatmap data
pub async fn analytics_heatmap(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::analytics::HeatmapPoint>>> {
    let points = state.analytics.heatmap().await?;
    Ok(Json(points))
}
