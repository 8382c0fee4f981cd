use crate::errors::AppError;
use crate::keep_awake::wav::{silent_wav, WavFormat};
use crate::keep_awake::Visibility;
use crate::models::{
    CycleResponse, DisplaySnapshot, KeepAwakeMode, KeepAwakeStatus, VisibilityRequest,
};
use crate::runtime::with_page_blocking;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::time::Duration;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let page = state.page.lock().await;
    Html(render_index(&page.snapshot()))
}

pub async fn get_display(State(state): State<AppState>) -> Json<DisplaySnapshot> {
    let page = state.page.lock().await;
    Json(page.snapshot())
}

pub async fn get_cycle(State(state): State<AppState>) -> Result<Json<CycleResponse>, AppError> {
    let status = with_page_blocking(&state.page, |page| page.cycle_status())
        .await
        .map_err(|err| {
            tracing::error!("cycle status read failed: {err}");
            AppError::internal("failed to read cycle status")
        })?;
    Ok(Json(status.into()))
}

pub async fn visibility(
    State(state): State<AppState>,
    Json(payload): Json<VisibilityRequest>,
) -> Json<KeepAwakeStatus> {
    let Some(keep_awake) = state.keep_awake else {
        return Json(disabled(payload.visible));
    };
    let mut keep_awake = keep_awake.lock().await;
    keep_awake
        .on_visibility_change(Visibility::from(payload.visible))
        .await;
    Json(keep_awake.status())
}

pub async fn interaction(State(state): State<AppState>) -> Json<KeepAwakeStatus> {
    let Some(keep_awake) = state.keep_awake else {
        return Json(disabled(true));
    };
    let mut keep_awake = keep_awake.lock().await;
    keep_awake.on_user_interaction().await;
    Json(keep_awake.status())
}

pub async fn silence() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "audio/wav")],
        silent_wav(&WavFormat::default(), Duration::from_secs(1)),
    )
}

fn disabled(visible: bool) -> KeepAwakeStatus {
    KeepAwakeStatus {
        mode: KeepAwakeMode::Disabled,
        visible,
    }
}
