//! VK 登录接口：校验签名、upsert 用户并签发 token。

use axum::http::StatusCode;
use nomvote_protocol::{HEADER_USER_TOKEN, Invocation, InvocationResponse, UserSession};
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        request::{decode_body, int_field, raw_text_field, text_field},
        response::{json_response, preflight_response},
    },
    auth::{signature::verify_signature, token::issue_user_token},
    store::{Store, UserProfile},
};

/// 处理一次 auth 调用。
pub(crate) async fn handle_auth<S: Store>(
    invocation: &Invocation,
    store: &S,
    secret: &str,
) -> InvocationResponse {
    match invocation.method().as_str() {
        "OPTIONS" => preflight_response(&format!("Content-Type, {HEADER_USER_TOKEN}")),
        "POST" => match authenticate(invocation, store, secret).await {
            Ok(session) => json_response(StatusCode::OK, &session),
            Err(err) => err.into_response(),
        },
        _ => ApiError::method_not_allowed().into_response(),
    }
}

/// 校验 → upsert → 签发；签名失败时不触碰存储。
async fn authenticate<S: Store>(
    invocation: &Invocation,
    store: &S,
    secret: &str,
) -> Result<UserSession, ApiError> {
    let body = decode_body(invocation)?;
    let vk_id = int_field(&body, "vk_id")?;
    let first_name = text_field(&body, "first_name");
    let last_name = text_field(&body, "last_name");
    let (Some(vk_id), Some(first_name), Some(last_name)) = (vk_id, first_name, last_name) else {
        return Err(ApiError::validation("Missing required fields"));
    };

    if !verify_signature(vk_id, secret, raw_text_field(&body, "sign")) {
        warn!(vk_id, "auth rejected: invalid signature");
        return Err(ApiError::forbidden("Invalid signature"));
    }

    let user = store
        .upsert_user(&UserProfile {
            vk_id,
            first_name,
            last_name,
            photo_url: text_field(&body, "photo_url"),
        })
        .await?;
    let token = issue_user_token(user.id, secret, user.vk_id);
    info!(user_id = user.id, vk_id = user.vk_id, "user authenticated");

    Ok(UserSession {
        id: user.id,
        vk_id: user.vk_id,
        first_name: user.first_name,
        last_name: user.last_name,
        photo_url: user.photo_url,
        token,
    })
}
