// 文件职责：
// 1) 定义函数调用环境与处理器之间的调用契约（Invocation / InvocationResponse）。
// 2) 定义 auth/voting 接口对客户端暴露的响应体结构。
// 3) 提供跨端一致的头部名、方法名与 CORS 常量。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// 调用方携带用户身份的请求头。
pub const HEADER_USER_ID: &str = "X-User-Id";
/// 客户端 token 请求头（仅用于 CORS 声明）。
pub const HEADER_USER_TOKEN: &str = "X-User-Token";
/// CORS 预检缓存时长（秒）。
pub const CORS_MAX_AGE_SEC: u32 = 86400;
/// 两个接口统一声明的 CORS 方法集合。
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// 缺省调用方法：调用事件未携带 httpMethod 时按 GET 处理。
pub const DEFAULT_HTTP_METHOD: &str = "GET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 调用环境分配的请求 ID（可选）。
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default = "default_http_method")]
    // HTTP 方法（大小写不敏感）。
    pub http_method: String,
    #[serde(default)]
    // 原始请求头；按名称大小写不敏感读取。
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 原始请求体（JSON 文本，或 base64 编码）。
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // query 参数（可选）。
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    // body 是否为 base64 编码。
    pub is_base64_encoded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 调用上下文（可选）。
    pub request_context: Option<RequestContext>,
}

/// 返回缺省 HTTP 方法。
fn default_http_method() -> String {
    DEFAULT_HTTP_METHOD.to_string()
}

impl Invocation {
    /// 构造最小调用事件：仅方法，其余为空。
    pub fn new(http_method: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            headers: HashMap::new(),
            body: None,
            query_string_parameters: None,
            is_base64_encoded: false,
            request_context: None,
        }
    }

    /// 追加请求头。
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// 设置请求体。
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// 大小写不敏感读取请求头。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// 归一化后的方法名（大写）。
    pub fn method(&self) -> String {
        self.http_method.trim().to_ascii_uppercase()
    }

    /// 调用环境分配的请求 ID。
    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.request_id.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    // HTTP 状态码。
    pub status_code: u16,
    // 响应头（有序，便于稳定输出）。
    pub headers: BTreeMap<String, String>,
    // 响应体（JSON 文本或空串）。
    pub body: String,
    // 响应体是否为 base64 编码；本服务恒为 false。
    pub is_base64_encoded: bool,
}

impl InvocationResponse {
    /// 读取响应头（大小写不敏感）。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    // 错误描述。
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    // 内部用户 ID。
    pub id: i64,
    // VK 外部用户 ID。
    pub vk_id: i64,
    // 名。
    pub first_name: String,
    // 姓。
    pub last_name: String,
    // 头像地址（可选）。
    pub photo_url: Option<String>,
    // 确定性不透明 token。
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationSummary {
    // 提名 ID。
    pub id: i64,
    // 稳定外部 key。
    pub slug: String,
    // 标题。
    pub title: String,
    // 描述。
    pub description: String,
    // 图标名。
    pub icon: String,
    // 颜色（渐变类名）。
    pub color: String,
    // 票数。
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationsBody {
    // 按 id 升序的全部提名。
    pub nominations: Vec<NominationSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    // 恒为 true。
    pub success: bool,
    // 投票后该提名的总票数。
    pub vote_count: i64,
}
