//! 投票接口：GET 列出提名与票数，POST 为某提名投一票。

use axum::http::StatusCode;
use nomvote_protocol::{
    HEADER_USER_ID, HEADER_USER_TOKEN, Invocation, InvocationResponse, NominationSummary,
    NominationsBody, VoteReceipt,
};
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        request::{decode_body, int_field},
        response::{json_response, preflight_response},
    },
    store::{Store, VoteOutcome},
};

/// 处理一次 voting 调用。
pub(crate) async fn handle_voting<S: Store>(
    invocation: &Invocation,
    store: &S,
) -> InvocationResponse {
    let result = match invocation.method().as_str() {
        "OPTIONS" => {
            return preflight_response(&format!(
                "Content-Type, {HEADER_USER_TOKEN}, {HEADER_USER_ID}"
            ));
        }
        "GET" => list_nominations(store)
            .await
            .map(|body| json_response(StatusCode::OK, &body)),
        "POST" => cast_vote(invocation, store)
            .await
            .map(|receipt| json_response(StatusCode::OK, &receipt)),
        _ => Err(ApiError::method_not_allowed()),
    };
    result.unwrap_or_else(ApiError::into_response)
}

/// 全部提名（零票也列出），按 id 升序。
async fn list_nominations<S: Store>(store: &S) -> Result<NominationsBody, ApiError> {
    let nominations = store
        .list_nominations()
        .await?
        .into_iter()
        .map(|row| NominationSummary {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            icon: row.icon,
            color: row.color,
            votes: row.votes,
        })
        .collect();
    Ok(NominationsBody { nominations })
}

/// 投票：先校验身份头，再校验 body，最后条件插入。
async fn cast_vote<S: Store>(invocation: &Invocation, store: &S) -> Result<VoteReceipt, ApiError> {
    let user_id = caller_user_id(invocation)?;
    let body = decode_body(invocation)?;
    let Some(nomination_id) = int_field(&body, "nomination_id")? else {
        return Err(ApiError::validation("Missing nomination_id"));
    };

    match store.cast_vote(user_id, nomination_id).await? {
        VoteOutcome::Recorded { vote_count } => {
            info!(user_id, nomination_id, vote_count, "vote recorded");
            Ok(VoteReceipt {
                success: true,
                vote_count,
            })
        }
        VoteOutcome::AlreadyVoted => {
            warn!(user_id, nomination_id, "duplicate vote rejected");
            Err(ApiError::conflict("Already voted for this nomination"))
        }
    }
}

/// 读取 `X-User-Id`：缺失为 401，非整数为 400。
fn caller_user_id(invocation: &Invocation) -> Result<i64, ApiError> {
    let raw = invocation
        .header(HEADER_USER_ID)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthenticated("User not authenticated"))?;
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid {HEADER_USER_ID}")))
}
