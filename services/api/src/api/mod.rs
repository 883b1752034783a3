//! 调用层公共部分：错误、请求解析与响应构造。

pub(crate) mod error;
pub(crate) mod request;
pub(crate) mod response;
