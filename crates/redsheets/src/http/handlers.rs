use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{debug, error, warn};

use super::{pages, AppState, Envelope, FormQuery};
use crate::error::{Error, Result};
use crate::record::{Kind, Record, RecordId};

const UNAVAILABLE_MESSAGE: &str = "PDF сервис временно недоступен";
const BAD_TYPE_MESSAGE: &str = "Неверный тип";

/// Run blocking store work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::internal(format!("store task failed: {e}")))?
}

fn page(result: Result<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Parse an integer path segment. Only plain digits are accepted, so `+1`
/// and `-0` do not resolve to a record.
fn path_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn error_json(status: StatusCode, err: &Error) -> Response {
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

pub(super) async fn index(State(state): State<AppState>) -> Response {
    debug!("GET /");
    page(pages::landing(&state.templates))
}

pub(super) async fn form(
    kind: Kind,
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(pairs)) => FormQuery::from_pairs(pairs),
        Err(e) => {
            debug!("Unreadable query on {kind} form, showing a blank form: {e}");
            FormQuery::default()
        }
    };
    debug!("GET /{kind} id={:?}", query.id);

    let record = match query.id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let service = state.services.get(kind).clone();
            let lookup = RecordId::from(id.as_str());
            match blocking(move || service.get(&lookup)).await {
                Ok(found) => found,
                Err(e) => {
                    error!("Lookup of {kind} {id} failed: {e}");
                    return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
                }
            }
        }
        None => None,
    };
    page(pages::form(&state.templates, kind, record.as_ref()))
}

pub(super) async fn save(kind: Kind, State(state): State<AppState>, body: Bytes) -> Json<Envelope> {
    debug!("POST /api/{kind} ({} bytes)", body.len());
    let result = match Record::from_slice(&body) {
        Ok(record) => {
            let service = state.services.get(kind).clone();
            blocking(move || service.upsert(record)).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(saved) => Json(Envelope::saved(saved.id_value())),
        Err(e) => {
            warn!("Saving {kind} failed: {e}");
            Json(Envelope::failure(e.to_string()))
        }
    }
}

pub(super) async fn list(kind: Kind, State(state): State<AppState>) -> Response {
    debug!("GET /{}", kind.plural());
    let service = state.services.get(kind).clone();
    match blocking(move || service.list()).await {
        Ok(records) => page(pages::list(&state.templates, kind, &records)),
        Err(e) => {
            error!("Listing {kind} failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub(super) async fn export_pdf(
    kind: Kind,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    debug!("GET /{kind}/{id}/pdf");
    let Some(id) = path_id(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let service = state.services.get(kind).clone();
    let record = match blocking(move || service.get(&RecordId::Number(id))).await {
        Ok(Some(record)) => record,
        Ok(None) => return (StatusCode::NOT_FOUND, kind.not_found_message()).into_response(),
        Err(e) => {
            error!("Loading {kind} {id} for export failed: {e}");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, &e);
        }
    };

    match state.renderer.render(kind, &record).await {
        Ok(pdf) => {
            let disposition = format!("attachment; filename=\"{kind}_{id}.pdf\"");
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                pdf,
            )
                .into_response()
        }
        Err(e) if e.is_unavailable() => {
            (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE).into_response()
        }
        Err(e) => {
            error!("PDF export of {kind} {id} failed: {e}");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

pub(super) async fn delete_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Response {
    debug!("DELETE /api/delete/{kind}/{id}");
    let Some(id) = path_id(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(kind) = kind.parse::<Kind>() else {
        return Json(Envelope::failure(BAD_TYPE_MESSAGE)).into_response();
    };

    let service = state.services.get(kind).clone();
    match blocking(move || service.delete(id)).await {
        Ok(_) => Json(Envelope::ok()).into_response(),
        Err(e) => {
            warn!("Deleting {kind} {id} failed: {e}");
            Json(Envelope::failure(e.to_string())).into_response()
        }
    }
}

pub(super) async fn static_asset(Path(file): Path<String>) -> Response {
    debug!("GET /static/{file}");
    let (content_type, body) = match file.as_str() {
        "sheet.js" => (
            "application/javascript; charset=utf-8",
            include_str!("../../static/sheet.js"),
        ),
        "sheet.css" => ("text/css; charset=utf-8", include_str!("../../static/sheet.css")),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_id_accepts_plain_digits() {
        assert_eq!(path_id("1"), Some(1));
        assert_eq!(path_id("007"), Some(7));
    }

    #[test]
    fn test_path_id_rejects_signs_and_junk() {
        for raw in ["", "+1", "-0", " 1", "1.0", "abc", "99999999999999999999999"] {
            assert_eq!(path_id(raw), None, "{raw:?}");
        }
    }
}
