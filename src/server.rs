// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The HTTP boundary: a thin JSON translation over the collection facade.
//! Carries no scheduling logic of its own.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::collection::Collection;
use crate::error::Error;
use crate::error::Fallible;
use crate::types::card::CreateCard;
use crate::types::card_id::CardId;
use crate::types::date::Date;

pub async fn start_server(collection: Arc<Collection>, port: u16) -> Fallible<()> {
    let app = Router::new();
    let app = app.route("/cards", post(create_card));
    let app = app.route("/cards/due", get(due_cards));
    let app = app.route("/reviews", post(review));
    let app = app.route("/daily/{domain}", get(daily_item));
    let app = app.with_state(collection);

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    log::info!("Listening on http://127.0.0.1:{port}/");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("Shutting down.");
}

/// Wraps core errors so each taxonomy variant maps to one status code.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyPool(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {}", self.0);
        }
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Deserialize)]
struct DateQuery {
    date: Option<String>,
}

impl DateQuery {
    fn parse(&self) -> Result<Option<Date>, ApiError> {
        match &self.date {
            Some(s) => Ok(Some(Date::parse(s)?)),
            None => Ok(None),
        }
    }
}

/// Unwrap a JSON body, turning extraction rejections (malformed JSON,
/// missing or ill-typed fields) into `InvalidInput` so they map to 400
/// rather than axum's default 422.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|e| Error::invalid_input(e.body_text()))?;
    Ok(body)
}

async fn create_card(
    State(collection): State<Arc<Collection>>,
    payload: Result<Json<CreateCard>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = json_body(payload)?;
    let card = collection.create_card(req)?;
    Ok((StatusCode::CREATED, Json(card)).into_response())
}

async fn due_cards(
    State(collection): State<Arc<Collection>>,
    Query(query): Query<DateQuery>,
) -> Result<Response, ApiError> {
    let date = query.parse()?.unwrap_or_else(|| collection.today());
    let due = collection.due(Some(date))?;
    let body = json!({
        "due": due,
        "total": due.len(),
        "date": date.to_string(),
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReviewRequest {
    card_id: CardId,
    quality: i64,
}

async fn review(
    State(collection): State<Arc<Collection>>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = json_body(payload)?;
    let card = collection.review(&req.card_id, req.quality)?;
    Ok((StatusCode::OK, Json(card)).into_response())
}

async fn daily_item(
    State(collection): State<Arc<Collection>>,
    Path(domain): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Response, ApiError> {
    let date = query.parse()?.unwrap_or_else(|| collection.today());
    let item = collection.daily_item(&domain, Some(date))?;
    let body = json!({
        "domain": domain,
        "date": date.to_string(),
        "item": item,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}
