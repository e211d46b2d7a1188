//! 响应构建帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use super::types::{MessageResponse, ValidationErrorResponse};
use super::validation::FieldErrors;

pub const VALIDATION_ERROR_MESSAGE: &str = "Validation error";

/// 构建 JSON 响应（显式 charset）
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// `{success:false,message}`
pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    json_response(
        status,
        &MessageResponse {
            success: false,
            message: message.into(),
        },
    )
}

/// 422 `{success:false,message:"Validation error",errors}`
pub fn validation_error_response(errors: FieldErrors) -> HttpResponse {
    json_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        &ValidationErrorResponse {
            success: false,
            message: VALIDATION_ERROR_MESSAGE.to_string(),
            errors,
        },
    )
}

/// 查询串中某个参数的最后一个值（重复参数以最后一个为准）
pub fn last_query_value(query_string: &str, key: &str) -> Result<Option<String>, String> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query_string)
        .map_err(|e| e.to_string())?
        .into_inner();
    Ok(pairs.into_iter().rev().find(|(k, _)| k == key).map(|(_, v)| v))
}

/// 请求体读取失败（超出大小限制、连接中断）时的 JSON 响应，保留原状态码
pub fn payload_error_response(err: &actix_web::Error, prefix: &str) -> HttpResponse {
    let status = err.as_response_error().status_code();
    error_response(status, format!("{}{}", prefix, err))
}

/// 解析 JSON 请求体；无法解析时视为空对象
pub fn parse_json_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_query_value() {
        assert_eq!(last_query_value("ip=8.8.8.8", "ip"), Ok(Some("8.8.8.8".to_string())));
        assert_eq!(
            last_query_value("ip=8.8.8.8&ip=1.1.1.1", "ip"),
            Ok(Some("1.1.1.1".to_string()))
        );
        assert_eq!(last_query_value("other=1", "ip"), Ok(None));
        assert_eq!(last_query_value("", "ip"), Ok(None));
        assert_eq!(
            last_query_value("ip=2001%3Adb8%3A%3A1", "ip"),
            Ok(Some("2001:db8::1".to_string()))
        );
    }

    #[test]
    fn test_parse_json_body_falls_back_to_empty_object() {
        assert_eq!(parse_json_body(b"{not json"), serde_json::json!({}));
        assert_eq!(parse_json_body(br#"{"ids":[1]}"#), serde_json::json!({"ids": [1]}));
    }
}
