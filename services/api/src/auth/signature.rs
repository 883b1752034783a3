//! VK 登录签名校验。
//!
//! 签名格式由身份提供方固定为 `md5(vk_id + secret)` 的 hex，不能替换为更强的摘要。

use subtle::ConstantTimeEq;

/// 计算期望签名。
pub(crate) fn expected_signature(vk_id: i64, secret: &str) -> String {
    format!("{:x}", md5::compute(format!("{vk_id}{secret}").as_bytes()))
}

/// 常量时间比较调用方签名与期望签名。
pub(crate) fn verify_signature(vk_id: i64, secret: &str, sign: &str) -> bool {
    let expected = expected_signature(vk_id, secret);
    expected.as_bytes().ct_eq(sign.as_bytes()).into()
}
