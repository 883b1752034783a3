//! 服务共享状态：存储句柄与服务端密钥，只读共享。

use std::{fmt, str::FromStr, sync::Arc};

use nomvote_protocol::{Invocation, InvocationResponse};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::{auth::handler::handle_auth, store::Store, voting::handler::handle_voting};

/// 处理器共享状态；克隆只复制引用。
#[derive(Clone)]
pub(crate) struct AppState<S> {
    /// 存储能力（连接池在处理器之外管理）。
    pub(crate) store: S,
    /// VK 签名与 token 派生密钥。
    pub(crate) vk_secret: Arc<str>,
}

impl<S: Store> AppState<S> {
    pub(crate) fn new(store: S, vk_secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            vk_secret: vk_secret.into(),
        }
    }

    /// 在带 request_id 的 span 中执行一次调用。
    pub(crate) async fn invoke(
        &self,
        endpoint: Endpoint,
        invocation: &Invocation,
    ) -> InvocationResponse {
        let request_id = invocation
            .request_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = info_span!(
            "invoke",
            %request_id,
            endpoint = %endpoint,
            method = %invocation.method(),
        );

        async {
            let response = match endpoint {
                Endpoint::Auth => handle_auth(invocation, &self.store, &self.vk_secret).await,
                Endpoint::Voting => handle_voting(invocation, &self.store).await,
            };
            info!(status = response.status_code, "invocation finished");
            response
        }
        .instrument(span)
        .await
    }
}

/// 可调用的处理器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Auth,
    Voting,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auth => "auth",
            Self::Voting => "voting",
        })
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "auth" => Ok(Self::Auth),
            "voting" => Ok(Self::Voting),
            other => Err(format!("unknown endpoint: {other} (expected auth|voting)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use nomvote_protocol::Invocation;

    use super::{AppState, Endpoint};
    use crate::store::memory::MemoryStore;

    #[test]
    fn endpoint_parses_and_displays() {
        assert_eq!("auth".parse::<Endpoint>(), Ok(Endpoint::Auth));
        assert_eq!(" voting ".parse::<Endpoint>(), Ok(Endpoint::Voting));
        assert!("admin".parse::<Endpoint>().is_err());
        assert_eq!(Endpoint::Voting.to_string(), "voting");
    }

    #[tokio::test]
    async fn invoke_routes_to_the_named_handler() {
        let state = AppState::new(MemoryStore::seeded(), "secret");
        let voting = state.invoke(Endpoint::Voting, &Invocation::new("GET")).await;
        assert_eq!(voting.status_code, 200);
        let auth = state.invoke(Endpoint::Auth, &Invocation::new("GET")).await;
        assert_eq!(auth.status_code, 405);
    }
}
