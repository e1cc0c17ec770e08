// API module entry
// Request entry point: access logging, CORS, preflight, route dispatch

mod handlers;
mod response;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::cors;
use crate::logger::{self, AccessLogEntry};

/// Handle a single HTTP request.
///
/// OPTIONS preflight requests short-circuit before routing. CORS headers
/// are attached to every response whose request carried an allow-listed
/// Origin, including error responses.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = req
        .headers()
        .get(hyper::header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let access_log = state.config.logging.access_log;
    if access_log {
        logger::log_request(&peer_addr, method.as_str(), &path);
    }

    let mut resp = if method == Method::OPTIONS {
        response::preflight_response()
    } else {
        route(req, &state).await
    };

    cors::apply_headers(
        origin.as_deref(),
        &state.config.cors.allowed_origins,
        resp.headers_mut(),
    );

    if access_log {
        let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), path);
        entry.status = resp.status().as_u16();
        entry.body_bytes = resp.body().size_hint().exact().unwrap_or(0);
        entry.duration_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(resp)
}

/// Exact-match dispatch on (method, path)
async fn route<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/api/settings") => handlers::get_settings(state).await,
        (Method::PUT, "/api/settings") => handlers::update_settings(req, state).await,
        (_, "/api/settings") => response::method_not_allowed(),
        _ => response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ApiConfig, Config, CorsConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    };
    use crate::settings::{Settings, UpdateMode};
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state(update_mode: UpdateMode) -> Arc<AppState> {
        Arc::new(AppState::new(Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "plain".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            api: ApiConfig { update_mode },
        }))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:54321".parse().unwrap()
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_defaults_after_startup() {
        let state = test_state(UpdateMode::Replace);
        let resp = handle_request(request(Method::GET, "/api/settings", ""), state, peer())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        let json = body_json(resp).await;
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["articlesPerPage"], 20);
        assert_eq!(json["refreshInterval"], 15);
        assert_eq!(json["notifications"], true);
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let state = test_state(UpdateMode::Replace);
        let payload = r#"{"theme":"light","articlesPerPage":50,"refreshInterval":5,"notifications":false}"#;

        let put_resp = handle_request(
            request(Method::PUT, "/api/settings", payload),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(put_resp.status(), StatusCode::OK);

        let get_resp = handle_request(request(Method::GET, "/api/settings", ""), state, peer())
            .await
            .unwrap();
        let json = body_json(get_resp).await;
        assert_eq!(json["theme"], "light");
        assert_eq!(json["articlesPerPage"], 50);
        assert_eq!(json["refreshInterval"], 5);
        assert_eq!(json["notifications"], false);
    }

    #[tokio::test]
    async fn test_put_malformed_json_leaves_store_unchanged() {
        let state = test_state(UpdateMode::Replace);

        let resp = handle_request(
            request(Method::PUT, "/api/settings", r#"{"theme": "#),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("Invalid JSON"));

        let settings = state.settings.read().await;
        assert_eq!(*settings, Settings::default());
    }

    #[tokio::test]
    async fn test_replace_mode_resets_omitted_fields() {
        let state = test_state(UpdateMode::Replace);
        // Seed a non-default value first
        handle_request(
            request(
                Method::PUT,
                "/api/settings",
                r#"{"theme":"light","articlesPerPage":99,"refreshInterval":1,"notifications":false}"#,
            ),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();

        let resp = handle_request(
            request(Method::PUT, "/api/settings", r#"{"theme":"sepia"}"#),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["theme"], "sepia");
        // Back to defaults, not the previously stored values
        assert_eq!(json["articlesPerPage"], 20);
        assert_eq!(json["refreshInterval"], 15);
        assert_eq!(json["notifications"], true);
    }

    #[tokio::test]
    async fn test_merge_mode_preserves_omitted_fields() {
        let state = test_state(UpdateMode::Merge);
        handle_request(
            request(
                Method::PUT,
                "/api/settings",
                r#"{"articlesPerPage":99,"notifications":false}"#,
            ),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();

        let resp = handle_request(
            request(Method::PUT, "/api/settings", r#"{"theme":"light"}"#),
            Arc::clone(&state),
            peer(),
        )
        .await
        .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["theme"], "light");
        assert_eq!(json["articlesPerPage"], 99);
        assert_eq!(json["notifications"], false);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let state = test_state(UpdateMode::Replace);
        let resp = handle_request(request(Method::GET, "/api/feeds", ""), state, peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow() {
        let state = test_state(UpdateMode::Replace);
        let resp = handle_request(request(Method::DELETE, "/api/settings", ""), state, peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.headers().get(hyper::header::ALLOW).unwrap(),
            "GET, PUT, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let state = test_state(UpdateMode::Replace);
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/settings")
            .header("Origin", "http://localhost:5173")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let resp = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "http://localhost:5173"
        );
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_unlisted_origin_proceeds_without_cors_headers() {
        let state = test_state(UpdateMode::Replace);
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/settings")
            .header("Origin", "http://evil.example.com")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let resp = handle_request(req, state, peer()).await.unwrap();
        // Request still served normally
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.headers().contains_key("Access-Control-Allow-Origin"));
    }

    #[tokio::test]
    async fn test_allowed_origin_headers_on_api_responses() {
        let state = test_state(UpdateMode::Replace);
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/settings")
            .header("Origin", "http://localhost:5173")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let resp = handle_request(req, state, peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("Access-Control-Allow-Credentials")
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_concurrent_updates_never_mix_payloads() {
        let state = test_state(UpdateMode::Replace);

        let mut handles = Vec::new();
        for i in 1..=16u32 {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                let payload = format!(
                    r#"{{"theme":"theme-{i}","articlesPerPage":{i},"refreshInterval":{i},"notifications":true}}"#
                );
                handle_request(
                    request(Method::PUT, "/api/settings", &payload),
                    state,
                    peer(),
                )
                .await
                .unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
        }

        // Last writer wins; the stored value must be exactly one payload,
        // never a field-level mix of two.
        let settings = state.settings.read().await;
        let i: u32 = settings
            .theme
            .strip_prefix("theme-")
            .expect("theme written by one of the tasks")
            .parse()
            .unwrap();
        assert!((1..=16).contains(&i));
        assert_eq!(settings.articles_per_page, i);
        assert_eq!(settings.refresh_interval, i);
    }
}
