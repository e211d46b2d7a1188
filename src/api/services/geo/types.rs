//! API 请求与响应类型

use serde::{Deserialize, Serialize};

use super::validation::FieldErrors;
use crate::storage::User;

/// `{success:true,data}`
#[derive(Serialize, Debug)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{success,message}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: FieldErrors,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeleteHistoryResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}
