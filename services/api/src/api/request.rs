//! 调用请求解析：body 解码与字段归一化。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use nomvote_protocol::Invocation;
use serde_json::{Map, Value};

use super::error::ApiError;

/// JSON 对象形式的请求体。
pub(crate) type JsonObject = Map<String, Value>;

/// 解码请求体：缺失或空白按 `{}` 处理；base64 标记时先解码。
pub(crate) fn decode_body(invocation: &Invocation) -> Result<JsonObject, ApiError> {
    let Some(raw) = invocation.body.as_deref() else {
        return Ok(JsonObject::new());
    };

    let text = if invocation.is_base64_encoded {
        let bytes = STANDARD
            .decode(raw.trim().as_bytes())
            .map_err(|_| ApiError::validation("Invalid base64 body"))?;
        String::from_utf8(bytes).map_err(|_| ApiError::validation("Invalid UTF-8 body"))?
    } else {
        raw.to_string()
    };

    if text.trim().is_empty() {
        return Ok(JsonObject::new());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation("Request body must be a JSON object")),
        Err(_) => Err(ApiError::validation("Invalid JSON body")),
    }
}

/// 读取整数字段：接受 JSON 整数或数字字符串。
///
/// 缺失、`null`、空串与 `0` 都视为未提供；其他非整数值报 400。
pub(crate) fn int_field(body: &JsonObject, key: &str) -> Result<Option<i64>, ApiError> {
    let invalid = || ApiError::validation(format!("Invalid {key}"));
    let parsed = match body.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => Some(number.as_i64().ok_or_else(invalid)?),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<i64>().map_err(|_| invalid())?)
            }
        }
        Some(_) => return Err(invalid()),
    };
    Ok(parsed.filter(|value| *value != 0))
}

/// 读取文本字段：去掉首尾空白，空串视为未提供。
pub(crate) fn text_field(body: &JsonObject, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// 读取原样文本字段（签名等不能改写的值）。
pub(crate) fn raw_text_field<'a>(body: &'a JsonObject, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use nomvote_protocol::Invocation;
    use serde_json::json;

    use super::{JsonObject, decode_body, int_field, text_field};

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn missing_or_blank_body_is_empty_object() {
        assert!(decode_body(&Invocation::new("POST")).expect("none").is_empty());
        assert!(
            decode_body(&Invocation::new("POST").with_body("  "))
                .expect("blank")
                .is_empty()
        );
    }

    #[test]
    fn base64_body_is_decoded() {
        let mut invocation = Invocation::new("POST").with_body(STANDARD.encode(r#"{"a":1}"#));
        invocation.is_base64_encoded = true;
        let body = decode_body(&invocation).expect("decode");
        assert_eq!(body.get("a"), Some(&json!(1)));
    }

    #[test]
    fn malformed_bodies_are_validation_errors() {
        for raw in ["{", "[1,2]", "\"text\""] {
            let err = decode_body(&Invocation::new("POST").with_body(raw)).expect_err(raw);
            assert_eq!(err.status.as_u16(), 400);
        }
        let mut invocation = Invocation::new("POST").with_body("%%%");
        invocation.is_base64_encoded = true;
        assert_eq!(decode_body(&invocation).expect_err("b64").status.as_u16(), 400);
    }

    #[test]
    fn int_field_accepts_numbers_and_numeric_strings() {
        let body = object(json!({"a": 42, "b": " 7 ", "c": 0, "d": "", "e": null}));
        assert_eq!(int_field(&body, "a").expect("a"), Some(42));
        assert_eq!(int_field(&body, "b").expect("b"), Some(7));
        assert_eq!(int_field(&body, "c").expect("c"), None);
        assert_eq!(int_field(&body, "d").expect("d"), None);
        assert_eq!(int_field(&body, "e").expect("e"), None);
        assert_eq!(int_field(&body, "missing").expect("missing"), None);
    }

    #[test]
    fn int_field_rejects_non_integers() {
        let body = object(json!({"a": 1.5, "b": "abc", "c": true, "d": [1]}));
        for key in ["a", "b", "c", "d"] {
            let err = int_field(&body, key).expect_err(key);
            assert_eq!(err.message, format!("Invalid {key}"));
        }
    }

    #[test]
    fn text_field_trims_and_drops_blank() {
        let body = object(json!({"a": "  Anna ", "b": "   ", "c": 5}));
        assert_eq!(text_field(&body, "a").as_deref(), Some("Anna"));
        assert_eq!(text_field(&body, "b"), None);
        assert_eq!(text_field(&body, "c"), None);
    }
}
