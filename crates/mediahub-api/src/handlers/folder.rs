//! Folder list, create, rename and delete handlers.
//!
//! Mutating operations run on their own task: if the client goes away or
//! the request times out, the saga still runs to completion instead of
//! stopping between a remote side effect and the matching catalog write.

use std::future::Future;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use crate::dto::request::{CreateFolderRequest, RenameFolderRequest};
use crate::dto::response::{
    ApiResponse, DeleteFolderResponse, FolderResponse, RenameFolderResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthOwner, parse_folder_id};
use crate::state::AppState;

/// Run a lifecycle operation detached from the request future.
async fn run_detached<T, F>(operation: F) -> AppResult<T>
where
    T: Send + 'static,
    F: Future<Output = AppResult<T>> + Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|e| AppError::internal(format!("Folder operation task failed: {e}")))?
}

/// GET /api/folders
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthOwner,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = state.folders.list(&auth).await?;
    Ok(Json(ApiResponse::ok(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthOwner,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let manager = state.folders.clone();
    let ctx = auth.into_context();

    let folder = run_detached(async move {
        manager.create(&ctx, req.server_id, &req.name).await
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(FolderResponse::from(folder))),
    ))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(id): Path<String>,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<ApiResponse<RenameFolderResponse>>, ApiError> {
    let id = parse_folder_id(&id)?;
    let manager = state.folders.clone();
    let ctx = auth.into_context();

    let renamed = run_detached(async move { manager.rename(&ctx, id, &req.name).await }).await?;

    Ok(Json(ApiResponse::ok(RenameFolderResponse::from(renamed))))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthOwner,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteFolderResponse>>, ApiError> {
    let id = parse_folder_id(&id)?;
    let manager = state.folders.clone();
    let ctx = auth.into_context();

    run_detached(async move { manager.delete(&ctx, id).await }).await?;

    Ok(Json(ApiResponse::ok(DeleteFolderResponse { id })))
}
