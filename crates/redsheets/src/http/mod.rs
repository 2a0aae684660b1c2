//! HTTP surface.
//!
//! Every kind gets the same four routes:
//!
//! | Route                  | Purpose                          |
//! |------------------------|----------------------------------|
//! | `GET /{kind}?id=`      | edit form, prefilled if found    |
//! | `POST /api/{kind}`     | create or update                 |
//! | `GET /{kind}/{id}/pdf` | printable sheet                  |
//! | `GET /{kind}s`         | list page                        |
//!
//! plus `GET /`, `DELETE /api/delete/{type}/{id}` and the static assets.

mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::record::Kind;
use crate::render::Renderer;
use crate::service::Services;
use crate::template::TemplateSet;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// One entity service per kind.
    pub services: Services,
    /// PDF renderer.
    pub renderer: Renderer,
    /// Page templates.
    pub templates: Arc<TemplateSet>,
}

impl AppState {
    /// Bundle the application's collaborators.
    #[must_use]
    pub fn new(services: Services, renderer: Renderer, templates: Arc<TemplateSet>) -> Self {
        Self {
            services,
            renderer,
            templates,
        }
    }
}

/// Query string of the form pages.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FormQuery {
    /// Id of the record to edit.
    pub id: Option<String>,
}

impl FormQuery {
    /// Take the first `id` among the query pairs; later repeats are ignored.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let id = pairs
            .into_iter()
            .find_map(|(key, value)| (key == "id").then_some(value));
        Self { id }
    }
}

/// Result envelope of mutation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Id of the saved record, or the submitted id when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Value>,
    /// Error text on failure.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl Envelope {
    /// Success without a payload.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            id: None,
            error: None,
        }
    }

    /// Success carrying a saved record's id.
    #[must_use]
    pub fn saved(id: impl Into<Value>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::ok()
        }
    }

    /// Failure carrying an error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Build the router with the default 16 MiB body limit.
pub fn build_router(state: AppState) -> Router {
    build_router_with_limit(state, DEFAULT_MAX_BODY_BYTES)
}

/// Build the router, rejecting request bodies larger than `max_body_bytes`.
pub fn build_router_with_limit(state: AppState, max_body_bytes: usize) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/api/delete/{kind}/{id}", delete(handlers::delete_record))
        .route("/static/{file}", get(handlers::static_asset));

    for kind in Kind::ALL {
        router = router
            .route(
                &format!("/{kind}"),
                get(
                    move |state: State<AppState>,
                          query: Result<Query<Vec<(String, String)>>, QueryRejection>| {
                        handlers::form(kind, state, query)
                    },
                ),
            )
            .route(
                &format!("/api/{kind}"),
                post(move |state: State<AppState>, body: Bytes| handlers::save(kind, state, body)),
            )
            .route(
                &format!("/{kind}/{{id}}/pdf"),
                get(move |state: State<AppState>, id: axum::extract::Path<String>| {
                    handlers::export_pdf(kind, state, id)
                }),
            )
            .route(
                &format!("/{}", kind.plural()),
                get(move |state: State<AppState>| handlers::list(kind, state)),
            );
    }

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
