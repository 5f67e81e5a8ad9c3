use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{RecordId, RecordInput, StaffId};
use super::rates::{RateConfig, RateConfigError, RateConfigStore};
use super::repository::{RecordFilter, RepositoryError, StaffDirectory, StaffRecordRepository};
use super::service::{RecordServiceError, StaffRecordService};
use super::slips::{SlipBuildError, SlipPeriod, SlipPeriodError};

type SharedService<R, D, C> = Arc<StaffRecordService<R, D, C>>;

/// Router builder exposing staff records, rate configurations and salary slips.
pub fn payroll_router<R, D, C>(service: SharedService<R, D, C>) -> Router
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/staff-records",
            post(create_handler::<R, D, C>).get(list_handler::<R, D, C>),
        )
        .route(
            "/api/v1/staff-records/:record_id",
            get(get_handler::<R, D, C>)
                .put(update_handler::<R, D, C>)
                .delete(delete_handler::<R, D, C>),
        )
        .route("/api/v1/payroll/preview", post(preview_handler::<R, D, C>))
        .route(
            "/api/v1/staff/:staff_id/next-record",
            get(next_record_handler::<R, D, C>),
        )
        .route(
            "/api/v1/rate-configs",
            get(rates_handler::<R, D, C>).post(publish_rates_handler::<R, D, C>),
        )
        .route(
            "/api/v1/rate-configs/history",
            get(rate_history_handler::<R, D, C>),
        )
        .route("/api/v1/salary-slips", get(salary_slips_handler::<R, D, C>))
        .with_state(service)
}

fn error_payload(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

pub(crate) fn service_error_response(error: RecordServiceError) -> Response {
    match error {
        RecordServiceError::DuplicateRecord { ref existing, .. } => {
            let payload = json!({
                "error": error.to_string(),
                "existing_record_id": existing,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        RecordServiceError::RecordNotFound(_) | RecordServiceError::StaffNotFound(_) => {
            error_payload(StatusCode::NOT_FOUND, error.to_string())
        }
        RecordServiceError::Rates(RateConfigError::Invalid { .. }) => {
            error_payload(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        RecordServiceError::Rates(RateConfigError::DuplicateEffectiveDate(_))
        | RecordServiceError::Repository(RepositoryError::Conflict) => {
            error_payload(StatusCode::CONFLICT, error.to_string())
        }
        RecordServiceError::Rates(RateConfigError::NoConfigAvailable { .. })
        | RecordServiceError::Repository(RepositoryError::NotFound) => {
            error_payload(StatusCode::NOT_FOUND, error.to_string())
        }
        RecordServiceError::Slips(SlipBuildError::Period(_)) => {
            error_payload(StatusCode::BAD_REQUEST, error.to_string())
        }
        RecordServiceError::Rates(RateConfigError::Unavailable(_))
        | RecordServiceError::Slips(SlipBuildError::Directory(_))
        | RecordServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error_payload(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

pub(crate) async fn create_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    axum::Json(input): axum::Json<RecordInput>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.create(input) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.detail())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Query(filter): Query<RecordFilter>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.list(&filter) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn get_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.get(&RecordId(record_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn update_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Path(record_id): Path<String>,
    axum::Json(input): axum::Json<RecordInput>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.update(&RecordId(record_id), input) {
        Ok(record) => (StatusCode::OK, axum::Json(record.detail())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn delete_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Path(record_id): Path<String>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.delete(&RecordId(record_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn preview_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    axum::Json(input): axum::Json<RecordInput>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.preview(&input) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn next_record_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Path(staff_id): Path<String>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.next_record_date(&StaffId(staff_id)) {
        Ok(next) => (StatusCode::OK, axum::Json(next)).into_response(),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateQuery {
    date: NaiveDate,
}

pub(crate) async fn rates_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Query(query): Query<RateQuery>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.rates_for(query.date) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn rate_history_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.rate_history() {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn publish_rates_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    axum::Json(config): axum::Json<RateConfig>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    match service.publish_rates(config) {
        Ok(published) => (StatusCode::CREATED, axum::Json(published)).into_response(),
        Err(error) => service_error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlipQuery {
    month: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: Option<String>,
}

impl SlipQuery {
    fn period(&self) -> Result<Option<SlipPeriod>, SlipPeriodError> {
        match (&self.month, self.from, self.to) {
            (Some(month), _, _) => SlipPeriod::parse_month(month).map(Some),
            (None, Some(from), Some(to)) => SlipPeriod::range(from, to).map(Some),
            _ => Ok(None),
        }
    }

    fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("csv"))
    }
}

pub(crate) async fn salary_slips_handler<R, D, C>(
    State(service): State<SharedService<R, D, C>>,
    Query(query): Query<SlipQuery>,
) -> Response
where
    R: StaffRecordRepository + 'static,
    D: StaffDirectory + 'static,
    C: RateConfigStore + 'static,
{
    let period = match query.period() {
        Ok(Some(period)) => period,
        Ok(None) => {
            return error_payload(
                StatusCode::BAD_REQUEST,
                "provide either month=YYYY-MM or both from and to".to_string(),
            )
        }
        Err(error) => return error_payload(StatusCode::BAD_REQUEST, error.to_string()),
    };

    let batch = match service.salary_slips(period) {
        Ok(batch) => batch,
        Err(error) => return service_error_response(error),
    };

    if !query.wants_csv() {
        return (StatusCode::OK, axum::Json(batch)).into_response();
    }

    match batch.to_csv() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => error_payload(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}
