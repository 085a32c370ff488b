use crate::server::{Result, ServerError, ServerRouter, json::Json, today};
use aushang_common::timeline::Timeline;
use aushang_db::client::BoardStore;
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(get_timeline)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/timeline", rejection(ServerError))]
struct TimelinePath();

async fn get_timeline(
    TimelinePath(): TimelinePath,
    State(board): State<Arc<BoardStore>>,
) -> Result<Json<Timeline>> {
    let posts = board.fetch_posts().await?;
    let timeline = Timeline::build(&posts, today());

    debug!(
        rows = timeline.rows.len(),
        undated = timeline.undated.len(),
        "Built timeline"
    );
    Ok(Json(timeline))
}
