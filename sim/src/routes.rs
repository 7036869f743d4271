use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info};

use arduino_ctl::{Channel, CommandResponse, MotorCommands, MoveCommand, StatsResponse};

use crate::{SimDevice, StatsMode};

type Reply = (StatusCode, Json<CommandResponse>);

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    state: Option<String>,
}

/// All firmware endpoints. Static routes win over the `/:endpoint`
/// catch-all, so `/stats` and `/motors` never reach it.
pub fn router(device: SimDevice) -> Router {
    Router::new()
        .route("/motors", post(drive_motors))
        .route("/stats", get(stats))
        .route("/:endpoint", get(endpoint))
        .with_state(device)
}

fn ok(message: String) -> Reply {
    (StatusCode::OK, Json(CommandResponse::new("ok", Some(message))))
}

fn error(status: StatusCode, message: String) -> Reply {
    (status, Json(CommandResponse::new("error", Some(message))))
}

fn malformed_json() -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        "{\"status\": \"o",
    )
        .into_response()
}

async fn answer(device: &SimDevice, reply: Reply) -> Response {
    if device.options().await.garbled_replies {
        return malformed_json();
    }
    reply.into_response()
}

async fn drive_motors(State(device): State<SimDevice>, Json(body): Json<MotorCommands>) -> Response {
    device.begin_request().await;
    info!("Motors <- {}", body);
    device.drive(body).await;
    answer(&device, ok(format!("Motors set to {}", body))).await
}

async fn endpoint(
    State(device): State<SimDevice>,
    Path(endpoint): Path<String>,
    Query(query): Query<StateQuery>,
) -> Response {
    device.begin_request().await;
    let reply = dispatch(&device, &endpoint, query).await;
    answer(&device, reply).await
}

async fn dispatch(device: &SimDevice, endpoint: &str, query: StateQuery) -> Reply {
    if let Some(command) = MoveCommand::ALL
        .into_iter()
        .find(|command| command.path_segment() == endpoint)
    {
        info!("Move <- {}", command);
        device.drive(command.motor_codes()).await;
        return match command {
            MoveCommand::Stop => ok("Stopped".to_string()),
            MoveCommand::Go(_) => ok(format!("Moving {}", command)),
        };
    }

    if let Some(channel) = Channel::from_path_segment(endpoint) {
        let enabled = match query.state.as_deref() {
            Some("true") => true,
            Some("false") => false,
            other => {
                debug!("Bad state {:?} for {}", other, channel);
                return error(
                    StatusCode::BAD_REQUEST,
                    "state must be true or false".to_string(),
                );
            }
        };
        info!("Sensor {} <- {}", channel, enabled);
        device.switch(channel, enabled).await;
        return ok(format!(
            "{} {}",
            channel.path_segment(),
            if enabled { "enabled" } else { "disabled" }
        ));
    }

    error(StatusCode::NOT_FOUND, format!("Unknown endpoint /{}", endpoint))
}

async fn stats(State(device): State<SimDevice>) -> Response {
    device.begin_request().await;

    match device.options().await.stats_mode {
        StatsMode::Live => {
            let stats = device.state().await.stats_lines();
            Json(StatsResponse { stats }).into_response()
        }
        StatsMode::Fixed(stats) => Json(StatsResponse { stats }).into_response(),
        StatsMode::Malformed => (
            [(header::CONTENT_TYPE, "application/json")],
            "{\"stats\": [\"temp=",
        )
            .into_response(),
        StatsMode::Error => (StatusCode::INTERNAL_SERVER_ERROR, "sensor bus fault").into_response(),
    }
}
