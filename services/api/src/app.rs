//! 应用装配：把 HTTP 请求翻译成调用事件，路由到处理器并监听。

use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::{RawQuery, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::Response,
    routing::{any, get},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use nomvote_protocol::{Invocation, InvocationResponse};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::Config,
    state::{AppState, Endpoint},
    store::{Store, postgres::PgStore},
};

/// 服务入口：建池、装配路由并监听。
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)?;
    let state = AppState::new(store, config.vk_secret.as_str());

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    info!("nomvote-api listening on {}", config.addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// 构造路由；CORS 由处理器自行响应，不挂全局 CORS 层。
pub(crate) fn router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/auth", any(auth_route::<S>))
        .route("/v1/voting", any(voting_route::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}

async fn auth_route<S: Store>(
    State(state): State<AppState<S>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let invocation = to_invocation(&method, &headers, query.as_deref(), &body);
    into_http_response(state.invoke(Endpoint::Auth, &invocation).await)
}

async fn voting_route<S: Store>(
    State(state): State<AppState<S>>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let invocation = to_invocation(&method, &headers, query.as_deref(), &body);
    into_http_response(state.invoke(Endpoint::Voting, &invocation).await)
}

/// HTTP 请求 → 调用事件。非 UTF-8 的 body 以 base64 传递。
fn to_invocation(
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
    body: &Bytes,
) -> Invocation {
    let mut invocation = Invocation::new(method.as_str());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            invocation
                .headers
                .insert(name.as_str().to_string(), value.to_string());
        }
    }

    invocation.query_string_parameters = query.map(|raw| {
        url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>()
    });

    if !body.is_empty() {
        match std::str::from_utf8(body) {
            Ok(text) => invocation.body = Some(text.to_string()),
            Err(_) => {
                invocation.body = Some(STANDARD.encode(body));
                invocation.is_base64_encoded = true;
            }
        }
    }
    invocation
}

/// 调用响应 → HTTP 响应。
fn into_http_response(response: InvocationResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = Response::new(Body::from(response.body));
    *http.status_mut() = status;
    for (name, value) in response.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => error!("drop invalid response header {name}"),
        }
    }
    http
}
