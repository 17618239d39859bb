//! File downloads. These are plain routes rather than server functions so the
//! browser can save the response as an attachment.

use axum::{
    Router,
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use jiff::Zoned;
use serde::Deserialize;
use types::audit::AuditFilters;
use types::bulk::OperationType;
use types::employee::EmployeeFilters;
use types::{Action, Error, Resource, Result, csv};

use crate::{Backend, Download, forbidden};

/// Audit exports stop after this many pages of results.
const MAX_AUDIT_EXPORT_PAGES: u32 = 50;

pub fn download_router() -> Router {
    Router::new()
        .route("/download/template", get(template))
        .route("/download/employees.csv", get(employees_csv))
        .route("/download/audit-logs.csv", get(audit_logs_csv))
}

#[derive(Deserialize)]
struct TemplateParams {
    #[serde(rename = "type")]
    operation: String,
}

async fn template(headers: HeaderMap, Query(params): Query<TemplateParams>) -> Response {
    respond(template_inner(&headers, &params.operation).await)
}

async fn template_inner(headers: &HeaderMap, operation: &str) -> Result<Download> {
    let backend = Backend::from_headers(headers).await?;
    let operation = OperationType::parse(operation)
        .ok_or_else(|| Error::bad_request("Invalid template type"))?;

    if !backend.profile().can_import(operation) {
        return Err(forbidden());
    }

    backend
        .call(backend.bulk_uploads().download_template(operation))
        .await
}

async fn employees_csv(headers: HeaderMap, Query(filters): Query<EmployeeFilters>) -> Response {
    respond(employees_csv_inner(&headers, &filters).await)
}

async fn employees_csv_inner(headers: &HeaderMap, filters: &EmployeeFilters) -> Result<Download> {
    let backend = Backend::from_headers(headers).await?;
    backend.require(Action::Export, Resource::Employee)?;

    let export = backend.call(backend.employees().export(filters)).await?;
    tracing::info!(
        user = %backend.profile().user.username,
        rows = export.data.len(),
        "exported employees"
    );

    Ok(Download::csv(
        format!("employees_{}.csv", Zoned::now().date()),
        csv::encode(&export.data),
    ))
}

async fn audit_logs_csv(headers: HeaderMap, Query(filters): Query<AuditFilters>) -> Response {
    respond(audit_logs_csv_inner(&headers, &filters).await)
}

async fn audit_logs_csv_inner(headers: &HeaderMap, filters: &AuditFilters) -> Result<Download> {
    let backend = Backend::from_headers(headers).await?;
    backend.require(Action::Export, Resource::AuditLog)?;

    let logs = backend
        .call(backend.audit_logs().list_all(filters, MAX_AUDIT_EXPORT_PAGES))
        .await?;
    tracing::info!(
        user = %backend.profile().user.username,
        rows = logs.len(),
        "exported audit logs"
    );

    Ok(Download::csv(
        format!("audit_logs_{}.csv", Zoned::now().date()),
        csv::encode(&logs),
    ))
}

fn respond(result: Result<Download>) -> Response {
    match result {
        Ok(download) => download.into_response(),
        Err(error) if error.is_unauthorized() => {
            Redirect::to("/auth/logout?expired=true").into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "download failed");
            let status =
                StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = error.backend_message().unwrap_or("Download failed").to_string();
            (status, message).into_response()
        }
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let mut response = self.bytes.into_response();
        let headers = response.headers_mut();

        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Some(file_name) = &self.file_name
            && let Ok(value) =
                HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name.replace('"', "")))
        {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;
    use jiff::civil::date;
    use types::QueryPairs;
    use types::audit::AuditAction;
    use types::employee::EmploymentType;

    use super::*;

    fn parsed<T: serde::de::DeserializeOwned>(path: &str, query: String) -> T {
        let uri: Uri = format!("{path}?{query}").parse().unwrap();
        Query::<T>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn employee_export_link_keeps_filters() {
        let filters = EmployeeFilters {
            search: "a&b c".into(),
            company: Some(3),
            department: "R&D".into(),
            employment_type: Some(EmploymentType::FullTime),
            is_current: Some(true),
            year_started: Some(2020),
            experience_years: Some(4),
            page: 2,
            ..Default::default()
        };

        let back: EmployeeFilters = parsed("/download/employees.csv", filters.query_string());
        assert_eq!(back, filters);
    }

    #[test]
    fn audit_export_link_keeps_filters() {
        let filters = AuditFilters {
            action: Some(AuditAction::BulkImport),
            table_name: "employees".into(),
            user: "ada".into(),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 1, 31)),
            search: "acme, inc".into(),
            page: 3,
        };

        let back: AuditFilters = parsed("/download/audit-logs.csv", filters.query_string());
        assert_eq!(back, filters);
    }

    #[test]
    fn csv_download_headers() {
        let response = Download::csv("employees.csv", "Name\r\nAda\r\n".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"employees.csv\""
        );
    }

    #[test]
    fn unauthorized_downloads_end_the_session() {
        let response = respond(Err(Error::Unauthorized));
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/logout?expired=true"
        );
    }

    #[test]
    fn failures_keep_backend_status() {
        let response = respond(Err(Error::bad_request("Invalid template type")));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
