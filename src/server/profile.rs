//! Handler for the character profile microsite endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::profile;
use crate::server::AppState;

#[derive(Deserialize)]
pub(super) struct ProfileQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// One endpoint serves the whole microsite: `?type=` narrows the
/// response to a single database (a bare array), no parameter returns
/// everything as one keyed bundle.
pub(super) async fn profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<Value>, ApiError> {
    let dbs = &state.config.databases;
    let result = match query.kind.as_deref() {
        Some("profiles") => profile::profiles(&state.notion, &dbs.profiles)
            .await
            .map(|profiles| json!(profiles)),
        Some("posts") => profile::diary_posts(&state.notion, &dbs.profile_posts)
            .await
            .map(|posts| json!(posts)),
        Some("memory") => profile::memory(&state.notion, &dbs.memory)
            .await
            .map(|memory| json!(memory)),
        Some("bgm") => profile::bgm(&state.notion, &dbs.bgm)
            .await
            .map(|bgm| json!(bgm)),
        _ => profile::bundle(&state.notion, dbs)
            .await
            .map(|bundle| json!(bundle)),
    };

    result
        .map(Json)
        .map_err(|e| e.with_label("Failed to fetch data from Notion"))
}
