//! Web UI: index page, per-service pages and downloadable combined reports.

use crate::config::DoctorConfig;
use crate::diagnostics::{collect_sections, Service};
use crate::report::{
    render, render_report, HtmlSink, ReportFormat, ReportMeta, REPORT_TITLE,
};
use crate::shutdown::shutdown_signal;
use crate::telemetry::{create_request_span, generate_correlation_id};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, Instrument};

/// File name stem of every downloadable report
pub const REPORT_FILE_STEM: &str = "hcp_doctor_report";

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html><head><meta charset='utf-8'><title>HashiCorp Doctor</title></head><body>
<h1>HashiCorp Doctor</h1>
<ul>
<li><a href="/vault">Vault Diagnostics</a></li>
<li><a href="/consul">Consul Diagnostics</a></li>
<li><a href="/nomad">Nomad Diagnostics</a></li>
<li><a href="/general">General Diagnostics</a></li>
<li><a href="/report/html" target="_blank"><b>View HTML Report</b></a></li>
<li><a href="/report/html/download" download><b>Download HTML Report</b></a></li>
<li><a href="/report/txt" download><b>Download Text Report</b></a></li>
<li><a href="/report/pdf" download><b>Download PDF Report</b></a></li>
<li><a href="/report/json" download><b>Download JSON Report</b></a></li>
</ul>
</body></html>
"#;

/// Build the web UI router
pub fn build_router(config: Arc<DoctorConfig>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/report/html", get(report_html_handler))
        .route("/report/html/download", get(report_html_download_handler))
        .route("/report/txt", get(report_txt_handler))
        .route("/report/pdf", get(report_pdf_handler))
        .route("/report/json", get(report_json_handler))
        .route("/{service}", get(service_handler))
        .layer(middleware::from_fn(trace_request))
        .with_state(config)
}

/// Bind and serve until SIGINT/SIGTERM
pub async fn serve(config: DoctorConfig) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind web UI to {addr}"))?;

    info!("Starting web UI at http://{}", addr);
    println!("Starting web UI at http://{addr}");

    axum::serve(listener, build_router(Arc::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web UI server failed")?;
    Ok(())
}

async fn trace_request(request: Request, next: Next) -> Response {
    let correlation_id = generate_correlation_id();
    let span = create_request_span(
        request.method().as_str(),
        request.uri().path(),
        &correlation_id,
    );
    async move {
        let response = next.run(request).await;
        info!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn service_handler(
    State(config): State<Arc<DoctorConfig>>,
    Path(slug): Path<String>,
) -> Response {
    let Some(service) = Service::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("Unknown service '{slug}'")).into_response();
    };

    let sections = collect_sections(&[service], &config).await;
    match render(&sections, HtmlSink::fragment()) {
        Ok(page) => Html(page).into_response(),
        Err(e) => render_failure(e),
    }
}

async fn report_html_handler(State(config): State<Arc<DoctorConfig>>) -> Response {
    combined_report(&config, ReportFormat::Html, false).await
}

async fn report_html_download_handler(State(config): State<Arc<DoctorConfig>>) -> Response {
    combined_report(&config, ReportFormat::Html, true).await
}

async fn report_txt_handler(State(config): State<Arc<DoctorConfig>>) -> Response {
    combined_report(&config, ReportFormat::Text, true).await
}

async fn report_pdf_handler(State(config): State<Arc<DoctorConfig>>) -> Response {
    combined_report(&config, ReportFormat::Pdf, true).await
}

async fn report_json_handler(State(config): State<Arc<DoctorConfig>>) -> Response {
    combined_report(&config, ReportFormat::Json, true).await
}

async fn combined_report(config: &DoctorConfig, format: ReportFormat, attachment: bool) -> Response {
    let sections = collect_sections(&Service::CLUSTER, config).await;
    let report = match render_report(&sections, format, &ReportMeta::new(REPORT_TITLE)) {
        Ok(report) => report,
        Err(e) => return render_failure(e),
    };

    let content_type = format.content_type().to_string();
    if attachment {
        let disposition = format!(
            "attachment; filename=\"{}.{}\"",
            REPORT_FILE_STEM,
            format.extension()
        );
        (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            report.body,
        )
            .into_response()
    } else {
        ([(header::CONTENT_TYPE, content_type)], report.body).into_response()
    }
}

fn render_failure(e: impl std::fmt::Display) -> Response {
    error!("Failed to render report: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to render report: {e}"),
    )
        .into_response()
}
