//! 鉴权模块：VK 签名校验、用户 token 派生与 auth 接口处理。

pub(crate) mod handler;
pub(crate) mod signature;
pub(crate) mod token;
