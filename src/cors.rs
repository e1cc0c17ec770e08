// CORS module
// Origin allow-listing for browser clients of the API

use hyper::header::{HeaderMap, HeaderValue};

/// Attach CORS headers to a response when the request origin is allow-listed.
///
/// Permissive by omission: an unlisted or absent origin gets no CORS headers,
/// but the request itself is never rejected.
pub fn apply_headers(origin: Option<&str>, allowed_origins: &[String], headers: &mut HeaderMap) {
    let Some(origin) = origin else {
        return;
    };
    if !allowed_origins.iter().any(|allowed| allowed == origin) {
        return;
    }

    // The origin came from a request header, so it is a valid header value,
    // but go through the fallible constructor rather than panic.
    let Ok(origin_value) = HeaderValue::from_str(origin) else {
        return;
    };

    headers.insert("Access-Control-Allow-Origin", origin_value);
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(
            "Accept, Content-Type, Content-Length, Accept-Encoding, Authorization, X-CSRF-Token",
        ),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
}
