// Settings endpoint handlers

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::response;
use crate::config::AppState;
use crate::settings::{Settings, SettingsPatch, UpdateMode};

/// Return the current settings as JSON
pub async fn get_settings(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let settings = state.settings.read().await;
    response::json_response(StatusCode::OK, &*settings)
}

/// Update the stored settings from a JSON request body.
///
/// The body is parsed before the write lock is taken, so a malformed
/// payload never touches the store. Depending on the configured update
/// mode the value is either replaced wholesale or patched field by field.
pub async fn update_settings<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return response::bad_request(&format!("Failed to read request body: {e}")),
    };

    let updated = match state.config.api.update_mode {
        UpdateMode::Replace => match serde_json::from_slice::<Settings>(&body) {
            Ok(new_settings) => {
                let mut settings = state.settings.write().await;
                *settings = new_settings;
                settings.clone()
            }
            Err(e) => return response::bad_request(&format!("Invalid JSON: {e}")),
        },
        UpdateMode::Merge => match serde_json::from_slice::<SettingsPatch>(&body) {
            Ok(patch) => {
                let mut settings = state.settings.write().await;
                patch.apply_to(&mut settings);
                settings.clone()
            }
            Err(e) => return response::bad_request(&format!("Invalid JSON: {e}")),
        },
    };

    response::json_response(StatusCode::OK, &updated)
}
