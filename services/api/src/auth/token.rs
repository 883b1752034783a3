//! 用户 token 派生。
//!
//! token 是 `sha256(id + secret + vk_id)` 的 hex，不落库；同样的输入
//! 总得到同样的 token，只有轮换密钥才能使其失效。

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

/// 为用户派生确定性 token。
pub(crate) fn issue_user_token(user_id: i64, secret: &str, vk_id: i64) -> String {
    sha256_hex(&format!("{user_id}{secret}{vk_id}"))
}

/// sha256 hex。
pub(crate) fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}
