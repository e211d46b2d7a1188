//! 请求体字段校验
//!
//! 错误以字段为 key（嵌套元素用 `ids.0` 形式），每个字段对应一组消息。

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::utils::is_valid_email;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn required(field: &str) -> String {
    format!("The {} field is required.", field)
}

/// 字符串字段：缺失、null、空白都算未提供
fn string_field<'a>(body: &'a Value, field: &str, errors: &mut FieldErrors) -> Option<&'a str> {
    match body.get(field) {
        None | Some(Value::Null) => {
            errors.add(field, required(field));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.add(field, required(field));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.add(field, format!("The {} field must be a string.", field));
            None
        }
    }
}

/// 登录请求体校验，返回 (email, password)
pub fn validate_login(body: &Value) -> Result<(String, String), FieldErrors> {
    let mut errors = FieldErrors::default();

    let email = string_field(body, "email", &mut errors).map(str::trim);
    if let Some(email) = email
        && !is_valid_email(email)
    {
        errors.add("email", "The email field must be a valid email address.");
    }
    let password = string_field(body, "password", &mut errors);

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => {
            Ok((email.to_string(), password.to_string()))
        }
        _ => Err(errors),
    }
}

/// `ids` 中单个元素的结构检查结果（下标, 整数值）
pub type IdCandidate = (usize, Option<i64>);

/// 删除请求体的结构校验（不访问存储）
///
/// 整体结构不合法时直接返回错误；否则返回每个元素的整数解析结果，
/// 非整数元素在 [`finish_ids_validation`] 中报告。
pub fn inspect_delete_ids(body: &Value) -> Result<Vec<IdCandidate>, FieldErrors> {
    let mut errors = FieldErrors::default();

    match body.get("ids") {
        None | Some(Value::Null) => {
            errors.add("ids", required("ids"));
            Err(errors)
        }
        // required 失败后不再检查 min
        Some(Value::Array(items)) if items.is_empty() => {
            errors.add("ids", required("ids"));
            Err(errors)
        }
        Some(Value::Array(items)) => Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| (index, as_integer(item)))
            .collect()),
        Some(_) => {
            errors.add("ids", "The ids field must be an array.");
            Err(errors)
        }
    }
}

/// 整数或整数字符串
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 结合存储中存在的 id 完成校验，返回去重前的整数 id 列表
pub fn finish_ids_validation(
    candidates: &[IdCandidate],
    existing: &HashSet<i64>,
) -> Result<Vec<i64>, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut ids = Vec::with_capacity(candidates.len());

    for &(index, value) in candidates {
        let field = format!("ids.{}", index);
        match value {
            Some(id) if existing.contains(&id) => ids.push(id),
            Some(_) => errors.add(field.clone(), format!("The selected {} is invalid.", field)),
            None => {
                errors.add(field.clone(), format!("The {} field must be an integer.", field));
                errors.add(field.clone(), format!("The selected {} is invalid.", field));
            }
        }
    }

    errors.into_result(ids)
}

/// 候选中所有合法整数（用于存在性查询）
pub fn candidate_integers(candidates: &[IdCandidate]) -> Vec<i64> {
    let mut ids: Vec<i64> = candidates.iter().filter_map(|(_, id)| *id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
