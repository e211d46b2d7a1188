//! HTTP API：JWT、中间件与端点

pub mod jwt;
pub mod middleware;
pub mod services;
