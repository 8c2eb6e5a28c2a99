use crate::service::webhook_processor::SIGNATURE_HEADER;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

/// Gateway notification endpoint. The raw body bytes are handed to the
/// processor untouched (the signature covers them exactly), and the reply is
/// 200 regardless of what processing decided — anything else would make the
/// gateway redeliver a request we already rejected.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signatures: Vec<String> = headers
        .get_all(SIGNATURE_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();

    state.webhook_processor.handle(&body, signatures).await;

    axum::http::StatusCode::OK
}
