use crate::dtos::{CreateSavingRequest, DateIntervalParams, SavingResponse, UpdateSavingRequest};
use crate::models::{Saving, SavingChanges};
use crate::services::{record_operation, DateFilter, SavingFilter};
use crate::startup::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use service_core::extract::ValidatedJson;

/// Log a failed store call and hide the cause behind a generic message.
fn store_failure(operation: &'static str, message: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |e| {
        tracing::error!(operation, error = %e, "Savings store call failed");
        record_operation(operation, "error");
        AppError::OperationFailed(message, anyhow::Error::new(e))
    }
}

fn saving_not_found(operation: &'static str, id: &str) -> AppError {
    tracing::info!(operation, saving_id = %id, "Saving not found");
    record_operation(operation, "not_found");
    AppError::NotFound(anyhow::anyhow!("Saving not found"))
}

async fn list_matching(
    state: &AppState,
    filter: SavingFilter,
) -> Result<Json<Vec<SavingResponse>>, AppError> {
    let kind = filter.kind();
    let savings = state
        .store
        .list(filter)
        .await
        .map_err(store_failure("list", "Error fetching savings"))?;

    tracing::debug!(filter = kind, count = savings.len(), "Listed savings");
    record_operation("list", "ok");

    Ok(Json(savings.into_iter().map(SavingResponse::from).collect()))
}

/// `GET /api/savings` and `GET /api/savings/read`
#[tracing::instrument(skip(state), fields(operation = "list"))]
pub async fn list_savings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavingResponse>>, AppError> {
    list_matching(&state, SavingFilter::All).await
}

/// `GET /api/savings/read/date-interval?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD`
#[tracing::instrument(skip(state, params), fields(operation = "list_by_date"))]
pub async fn list_savings_by_date(
    State(state): State<AppState>,
    params: Result<Query<DateIntervalParams>, QueryRejection>,
) -> Result<Json<Vec<SavingResponse>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

    let start = params
        .start_date
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("startDate is required")))?;
    let filter = DateFilter::from_params(start, params.end_date)?;

    list_matching(&state, SavingFilter::Date(filter)).await
}

/// `GET /api/savings/read/category/:category`
#[tracing::instrument(skip(state), fields(operation = "list_by_category"))]
pub async fn list_savings_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<SavingResponse>>, AppError> {
    list_matching(&state, SavingFilter::Category(category)).await
}

/// `POST /api/savings` and `POST /api/savings/save`
#[tracing::instrument(skip(state, req), fields(operation = "create"))]
pub async fn create_saving(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateSavingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let saving = state
        .store
        .insert(Saving::from(req))
        .await
        .map_err(store_failure("create", "Error creating saving"))?;

    tracing::info!(
        saving_id = %saving.id,
        title = %saving.title,
        amount = saving.amount,
        "Saving created"
    );
    record_operation("create", "ok");

    Ok((StatusCode::CREATED, Json(SavingResponse::from(saving))))
}

/// `PUT /api/savings/:id` and `PUT /api/savings/update/:id`
#[tracing::instrument(skip(state, req), fields(operation = "update"))]
pub async fn update_saving(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateSavingRequest>,
) -> Result<Json<SavingResponse>, AppError> {
    let changes = SavingChanges::from(req);
    if changes.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No fields to update")));
    }

    let saving = state
        .store
        .update(&id, changes)
        .await
        .map_err(store_failure("update", "Error updating saving"))?
        .ok_or_else(|| saving_not_found("update", &id))?;

    tracing::info!(saving_id = %saving.id, "Saving updated");
    record_operation("update", "ok");

    Ok(Json(SavingResponse::from(saving)))
}

/// `DELETE /api/savings/:id` and `DELETE /api/savings/delete/:id`
#[tracing::instrument(skip(state), fields(operation = "delete"))]
pub async fn delete_saving(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state
        .store
        .delete(&id)
        .await
        .map_err(store_failure("delete", "Error deleting saving"))?;

    if !removed {
        return Err(saving_not_found("delete", &id));
    }

    tracing::info!(saving_id = %id, "Saving deleted");
    record_operation("delete", "ok");

    Ok(StatusCode::NO_CONTENT)
}
