use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum GeolocatorError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    Unauthorized(String),
    Conflict(String),
    Provider(String),
    Internal(String),
}

impl GeolocatorError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeolocatorError::DatabaseConfig(_) => "E001",
            GeolocatorError::DatabaseConnection(_) => "E002",
            GeolocatorError::DatabaseOperation(_) => "E003",
            GeolocatorError::FileOperation(_) => "E004",
            GeolocatorError::Validation(_) => "E005",
            GeolocatorError::NotFound(_) => "E006",
            GeolocatorError::Serialization(_) => "E007",
            GeolocatorError::Unauthorized(_) => "E008",
            GeolocatorError::Conflict(_) => "E009",
            GeolocatorError::Provider(_) => "E010",
            GeolocatorError::Internal(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeolocatorError::DatabaseConfig(_) => "Database Configuration Error",
            GeolocatorError::DatabaseConnection(_) => "Database Connection Error",
            GeolocatorError::DatabaseOperation(_) => "Database Operation Error",
            GeolocatorError::FileOperation(_) => "File Operation Error",
            GeolocatorError::Validation(_) => "Validation Error",
            GeolocatorError::NotFound(_) => "Resource Not Found",
            GeolocatorError::Serialization(_) => "Serialization Error",
            GeolocatorError::Unauthorized(_) => "Unauthorized",
            GeolocatorError::Conflict(_) => "Conflict",
            GeolocatorError::Provider(_) => "Geolocation Provider Error",
            GeolocatorError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeolocatorError::DatabaseConfig(msg)
            | GeolocatorError::DatabaseConnection(msg)
            | GeolocatorError::DatabaseOperation(msg)
            | GeolocatorError::FileOperation(msg)
            | GeolocatorError::Validation(msg)
            | GeolocatorError::NotFound(msg)
            | GeolocatorError::Serialization(msg)
            | GeolocatorError::Unauthorized(msg)
            | GeolocatorError::Conflict(msg)
            | GeolocatorError::Provider(msg)
            | GeolocatorError::Internal(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            GeolocatorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GeolocatorError::NotFound(_) => StatusCode::NOT_FOUND,
            GeolocatorError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GeolocatorError::Conflict(_) => StatusCode::CONFLICT,
            GeolocatorError::Provider(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeolocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeolocatorError {}

// 便捷的构造函数
impl GeolocatorError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Serialization(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Conflict(msg.into())
    }

    pub fn provider<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Provider(msg.into())
    }

    pub fn internal_error<T: Into<String>>(msg: T) -> Self {
        GeolocatorError::Internal(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for GeolocatorError {
    fn from(err: sea_orm::DbErr) -> Self {
        GeolocatorError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for GeolocatorError {
    fn from(err: std::io::Error) -> Self {
        GeolocatorError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GeolocatorError {
    fn from(err: serde_json::Error) -> Self {
        GeolocatorError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeolocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            GeolocatorError::validation("x").http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            GeolocatorError::unauthorized("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GeolocatorError::provider("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GeolocatorError::database_operation("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = GeolocatorError::not_found("user 42");
        assert_eq!(err.format_simple(), "Resource Not Found: user 42");
        assert_eq!(err.to_string(), "Resource Not Found: user 42");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: GeolocatorError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, GeolocatorError::Serialization(_)));
        assert_eq!(err.code(), "E007");
    }
}
