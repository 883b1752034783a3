//! 调用响应构造：JSON 响应、错误响应与 CORS 预检响应。

use std::collections::BTreeMap;

use axum::http::StatusCode;
use nomvote_protocol::{CORS_ALLOW_METHODS, CORS_MAX_AGE_SEC, ErrorBody, InvocationResponse};
use serde::Serialize;
use tracing::error;

const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");

/// 构造 JSON 响应；带 `Content-Type` 与允许任意来源。
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> InvocationResponse {
    match serde_json::to_string(body) {
        Ok(encoded) => InvocationResponse {
            status_code: status.as_u16(),
            headers: json_headers(),
            body: encoded,
            is_base64_encoded: false,
        },
        Err(err) => {
            error!("encode response body failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("encode response failed: {err}"),
            )
        }
    }
}

/// 构造错误响应 `{"error": message}`。
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> InvocationResponse {
    let body = ErrorBody {
        error: message.into(),
    };
    InvocationResponse {
        status_code: status.as_u16(),
        headers: json_headers(),
        body: serde_json::to_string(&body).unwrap_or_else(|_| r#"{"error":"internal"}"#.into()),
        is_base64_encoded: false,
    }
}

/// CORS 预检：200、空 body、宽松跨域头。
pub(crate) fn preflight_response(allow_headers: &str) -> InvocationResponse {
    let headers = BTreeMap::from([
        (ALLOW_ORIGIN.0.to_string(), ALLOW_ORIGIN.1.to_string()),
        (
            "Access-Control-Allow-Methods".to_string(),
            CORS_ALLOW_METHODS.to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            allow_headers.to_string(),
        ),
        (
            "Access-Control-Max-Age".to_string(),
            CORS_MAX_AGE_SEC.to_string(),
        ),
    ]);
    InvocationResponse {
        status_code: StatusCode::OK.as_u16(),
        headers,
        body: String::new(),
        is_base64_encoded: false,
    }
}

fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        (ALLOW_ORIGIN.0.to_string(), ALLOW_ORIGIN.1.to_string()),
    ])
}
