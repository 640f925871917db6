use crate::server::AppContext;
use crate::status::StatusSnapshot;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use crosscast_common::{EpisodeId, Error, Language};
use crosscast_db::models::Episode;
use crosscast_db::pool::get_conn;
use crosscast_db::queries::episodes::{self, NewEpisode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/episodes", post(create_episode).get(list_episodes))
        .route("/episodes/:id", get(get_episode))
        .route("/episodes/:id/process", post(process_episode))
        .route("/episodes/:id/status", get(episode_status))
}

fn internal_error(e: Error) -> (StatusCode, String) {
    tracing::error!("Request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[derive(Deserialize)]
struct CreateEpisodeRequest {
    title: String,
    #[serde(default)]
    description: String,
    source_language: Language,
    target_language: Language,
    media_url: String,
    #[serde(default)]
    file_size: i64,
}

async fn create_episode(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateEpisodeRequest>,
) -> Result<(StatusCode, Json<Episode>), (StatusCode, String)> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title cannot be empty".to_string()));
    }
    if payload.media_url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Media URL cannot be empty".to_string(),
        ));
    }

    let new = NewEpisode {
        title: title.to_string(),
        description: payload.description,
        source_language: payload.source_language,
        target_language: payload.target_language,
        media_url: payload.media_url,
        file_size: payload.file_size,
    };

    let episode = {
        let conn = get_conn(&ctx.pool).map_err(internal_error)?;
        episodes::create_episode(&conn, &new).map_err(internal_error)?
    };

    tracing::info!(episode_id = %episode.id, title = %episode.title, "Registered episode");
    Ok((StatusCode::CREATED, Json(episode)))
}

#[derive(Deserialize)]
struct ListEpisodesQuery {
    limit: Option<usize>,
}

async fn list_episodes(
    State(ctx): State<AppContext>,
    Query(params): Query<ListEpisodesQuery>,
) -> Result<Json<Vec<Episode>>, (StatusCode, String)> {
    let limit = params.limit.unwrap_or(50);
    let episodes = {
        let conn = get_conn(&ctx.pool).map_err(internal_error)?;
        episodes::list_episodes(&conn, limit).map_err(internal_error)?
    };
    Ok(Json(episodes))
}

async fn get_episode(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Episode>, StatusCode> {
    let episode = {
        let conn = get_conn(&ctx.pool).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        episodes::get_episode(&conn, EpisodeId::from(id))
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    };
    episode.map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[derive(Serialize)]
struct ProcessAccepted {
    success: bool,
    id: EpisodeId,
}

/// Start the pipeline for an episode. Returns 202 immediately; the run
/// proceeds in a background task and is observed via the status endpoint.
async fn process_episode(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ProcessAccepted>), (StatusCode, String)> {
    let episode_id = EpisodeId::from(id);

    let episode = {
        let conn = get_conn(&ctx.pool).map_err(internal_error)?;
        episodes::get_episode(&conn, episode_id).map_err(internal_error)?
    };
    let Some(episode) = episode else {
        return Err((StatusCode::NOT_FOUND, "Episode not found".to_string()));
    };

    // A terminal episode has already had its one run; re-running is
    // unsupported.
    if episode.status.is_terminal() {
        return Err((
            StatusCode::CONFLICT,
            format!("Episode already {}", episode.status),
        ));
    }

    let orchestrator = ctx.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(episode_id).await {
            tracing::error!(episode_id = %episode_id, error = %e, "Pipeline run errored");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ProcessAccepted {
            success: true,
            id: episode_id,
        }),
    ))
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    #[serde(flatten)]
    snapshot: StatusSnapshot,
}

async fn episode_status(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<serde_json::Value>)> {
    match ctx.status.snapshot(EpisodeId::from(id)) {
        Ok(snapshot) => Ok(Json(StatusResponse {
            success: true,
            snapshot,
        })),
        Err(Error::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Episode not found" })),
        )),
        Err(e) => {
            tracing::error!("Status fetch failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Failed to fetch status" })),
            ))
        }
    }
}
