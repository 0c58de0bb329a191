//
// Copyright 2017-2026 VSPC Contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! HTTP retrieval surface: `GET /console_log/{uuid}`, gated by HTTP Basic
//! auth when a username/password is configured, serving the same files the
//! log sink writes; plus `GET /debug/metrics`, a JSON snapshot of
//! [`ServerMetrics`] behind the same auth gate.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::identity::normalize_vm_id;
use crate::metrics::ServerMetrics;

#[derive(Clone)]
pub struct HttpState {
    pub serial_log_dir: Arc<PathBuf>,
    pub username: Option<Arc<str>>,
    pub password: Option<Arc<str>>,
    pub metrics: Arc<ServerMetrics>,
}

impl HttpState {
    pub fn new(
        serial_log_dir: PathBuf,
        username: Option<String>,
        password: Option<String>,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            serial_log_dir: Arc::new(serial_log_dir),
            username: username.map(Arc::from),
            password: password.map(Arc::from),
            metrics,
        }
    }
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/console_log/{uuid}", get(get_console_log))
        .route("/debug/metrics", get(get_metrics))
        .with_state(state)
}

async fn get_metrics(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    if let Some(rejection) = check_auth(&state, &headers) {
        return rejection;
    }
    Json(state.metrics.snapshot()).into_response()
}

async fn get_console_log(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(uuid): Path<String>,
) -> Response {
    if let Some(rejection) = check_auth(&state, &headers) {
        return rejection;
    }

    let normalized = normalize_vm_id(&uuid);
    let path = state.serial_log_dir.join(&normalized);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response(),
        Err(err) => {
            debug!(vm_id = %normalized, %err, "console log not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Returns `Some(response)` if the request must be rejected, `None` if it
/// may proceed. Auth is entirely disabled (matches every request) when no
/// username is configured, the same default the reference server uses.
fn check_auth(state: &HttpState, headers: &HeaderMap) -> Option<Response> {
    let (Some(expected_user), Some(expected_pass)) = (&state.username, &state.password) else {
        return None;
    };

    let unauthorized = || {
        let mut response = StatusCode::UNAUTHORIZED.into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            header::HeaderValue::from_static("Basic realm=\"Login Required\""),
        );
        response
    };

    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Some(unauthorized());
    };
    let Some(encoded) = value.strip_prefix("Basic ") else {
        return Some(unauthorized());
    };
    let Ok(decoded) = BASE64.decode(encoded) else {
        return Some(unauthorized());
    };
    let Ok(credentials) = String::from_utf8(decoded) else {
        return Some(unauthorized());
    };
    let Some((user, pass)) = credentials.split_once(':') else {
        return Some(unauthorized());
    };

    if user == expected_user.as_ref() && pass == expected_pass.as_ref() {
        None
    } else {
        Some(unauthorized())
    }
}
