//! API 错误定义与响应转换。

use axum::http::StatusCode;
use nomvote_protocol::InvocationResponse;
use tracing::{debug, error};

use super::response::error_response;
use crate::store::StoreError;

/// 错误分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// 缺失或格式错误的输入。
    Validation,
    /// 签名错误或缺少身份。
    Authentication,
    /// 重复投票。
    Conflict,
    /// 不支持的 HTTP 方法。
    MethodNotAllowed,
    /// 底层存储失败。
    Storage,
}

/// 接口错误：分类 + 状态码 + 对外描述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiError {
    pub(crate) kind: ErrorKind,
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ApiError {
    fn new(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// 400：输入缺失或非法。
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, StatusCode::BAD_REQUEST, message)
    }

    /// 401：未携带身份。
    pub(crate) fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, StatusCode::UNAUTHORIZED, message)
    }

    /// 403：身份断言校验失败。
    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, StatusCode::FORBIDDEN, message)
    }

    /// 409：重复投票。
    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, StatusCode::CONFLICT, message)
    }

    /// 405：方法不支持。
    pub(crate) fn method_not_allowed() -> Self {
        Self::new(
            ErrorKind::MethodNotAllowed,
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        )
    }

    /// 转换为统一响应体 `{"error": ...}`；存储错误按 error 级别记录。
    pub(crate) fn into_response(self) -> InvocationResponse {
        match self.kind {
            ErrorKind::Storage => error!(status = %self.status, "store failure: {}", self.message),
            _ => debug!(status = %self.status, kind = ?self.kind, "request rejected: {}", self.message),
        }
        error_response(self.status, self.message)
    }
}

impl From<StoreError> for ApiError {
    /// 存储错误原样透出（受信内部环境）。
    fn from(err: StoreError) -> Self {
        Self::new(
            ErrorKind::Storage,
            StatusCode::INTERNAL_SERVER_ERROR,
            err.message(),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{ApiError, ErrorKind};
    use crate::store::StoreError;

    #[test]
    fn store_errors_keep_their_detail() {
        let err = ApiError::from(StoreError::new("connection refused"));
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let response = err.into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"error":"connection refused"}"#);
    }

    #[test]
    fn authentication_errors_split_401_and_403() {
        assert_eq!(ApiError::unauthenticated("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(ApiError::forbidden("x").kind, ErrorKind::Authentication);
    }
}
