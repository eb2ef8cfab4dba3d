use std::num::NonZeroU32;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use files_listing::{ListingPage, ListingQuery, PageToken};
use files_store::{ObjectKey, ObjectMetadata, DEFAULT_CONTENT_TYPE};
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::endpoint::{HealthResponse, PutFileResponse};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Query string of `GET /files`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListFilesParams {
    #[serde(default, alias = "directory")]
    pub prefix: Option<String>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub page_token: Option<String>,
}

impl ListFilesParams {
    /// Resolve defaults and limits. Non-positive page sizes are rejected;
    /// sizes above the configured maximum are clamped to it. An empty page
    /// token means "first page".
    pub fn into_query(self, config: &ServerConfig) -> ServerResult<ListingQuery> {
        let requested = self.page_size.unwrap_or(i64::from(config.default_page_size));
        if requested < 1 {
            return Err(ServerError::InvalidPageSize(requested));
        }
        let clamped = requested.min(i64::from(config.max_page_size));
        let page_size = u32::try_from(clamped)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ServerError::InvalidPageSize(requested))?;

        let page_token = self
            .page_token
            .filter(|t| !t.is_empty())
            .map(PageToken::from_client);

        Ok(ListingQuery::new(self.prefix.unwrap_or_default(), page_size).with_page_token(page_token))
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// `GET /files`
pub async fn list_files(
    State(state): State<AppState>,
    params: Result<Query<ListFilesParams>, QueryRejection>,
) -> ServerResult<Json<ListingPage>> {
    let Query(params) = params.map_err(|e| ServerError::InvalidQuery(e.body_text()))?;
    let query = params.into_query(&state.config)?;
    let page = state.paginator.list(&query).await?;
    Ok(Json(page))
}

/// `PUT /files/{path}` with a multipart body carrying a `file` field.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    mut multipart: Multipart,
) -> ServerResult<(StatusCode, Json<PutFileResponse>)> {
    let key = ObjectKey::parse(path)?;
    let (data, content_type) = read_file_field(&mut multipart).await?;
    let size = data.len();

    let existed = state.store.object_exists(state.bucket(), &key).await?;
    state
        .store
        .put_object(state.bucket(), &key, data, &content_type)
        .await?;
    tracing::info!(key = %key, size, existed, "file stored");

    let (status, message) = if existed {
        (StatusCode::OK, format!("Existing file updated at path: /{key}"))
    } else {
        (StatusCode::CREATED, format!("New file uploaded at path: /{key}"))
    };
    Ok((
        status,
        Json(PutFileResponse {
            file_path: key.into_string(),
            message,
        }),
    ))
}

async fn read_file_field(multipart: &mut Multipart) -> ServerResult<(Bytes, String)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await?;
        return Ok((data, content_type));
    }
    Err(ServerError::MissingFile)
}

/// `GET /files/{path}`
pub async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ServerResult<Response> {
    let key = ObjectKey::parse(path)?;
    let object = state.store.get_object(state.bucket(), &key).await?;
    Ok((object_headers(&object.metadata), object.data).into_response())
}

/// `HEAD /files/{path}`
pub async fn head_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ServerResult<(StatusCode, HeaderMap)> {
    let key = ObjectKey::parse(path)?;
    let metadata = state.store.head_object(state.bucket(), &key).await?;
    Ok((StatusCode::OK, object_headers(&metadata)))
}

/// `DELETE /files/{path}`. Deleting a missing file is a 404.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ServerResult<StatusCode> {
    let key = ObjectKey::parse(path)?;
    if !state.store.object_exists(state.bucket(), &key).await? {
        return Err(files_store::StoreError::NotFound {
            bucket: state.bucket().to_string(),
            key: key.into_string(),
        }
        .into());
    }
    state.store.delete_object(state.bucket(), &key).await?;
    tracing::info!(key = %key, "file deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn object_headers(metadata: &ObjectMetadata) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&metadata.content_type)
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.size));
    if let Ok(value) = HeaderValue::from_str(&http_date(metadata.last_modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", metadata.etag)) {
        headers.insert(header::ETAG, value);
    }
    headers
}

/// RFC 7231 IMF-fixdate.
fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
