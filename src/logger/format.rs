//! Access log format module
//!
//! Supports multiple log formats:
//! - `plain` (REQUEST/RESPONSE lines, the default)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;

/// Access log entry for one completed request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client socket address
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method (GET, PUT, ...)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    /// Request processing time in microseconds
    pub duration_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            status: 200,
            body_bytes: 0,
            duration_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "plain" => self.format_plain(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// Default response line
    /// `RESPONSE: $remote_addr $method $path - status: $status - duration: $ms`
    fn format_plain(&self) -> String {
        format!(
            "RESPONSE: {} {} {} - status: {} - duration: {:.3}ms",
            self.remote_addr,
            self.method,
            self.path,
            self.status,
            self.duration_ms(),
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/1.1\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status,
            self.body_bytes,
        )
    }

    /// JSON structured log format
    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "duration_us": self.duration_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client socket address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI path
    /// - `$request_time` - Processing time in seconds (3 decimal places)
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    fn format_custom(&self, pattern: &str) -> String {
        let mut result = pattern.to_string();

        result = result.replace("$remote_addr", &self.remote_addr);
        result = result.replace(
            "$time_local",
            &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
        );
        // $request_time before $request_method/$request_uri is irrelevant
        // here since none is a prefix of another, but keep the longest
        // variables first anyway.
        result = result.replace("$request_method", &self.method);
        result = result.replace("$request_uri", &self.path);
        result = result.replace(
            "$request_time",
            &format!("{:.3}", self.duration_us as f64 / 1_000_000.0),
        );
        result = result.replace("$body_bytes_sent", &self.body_bytes.to_string());
        result = result.replace("$status", &self.status.to_string());

        result
    }

    #[allow(clippy::cast_precision_loss)]
    fn duration_ms(&self) -> f64 {
        self.duration_us as f64 / 1000.0
    }
}
