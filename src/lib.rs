//! Geolocator - IP geolocation lookup with per-user search history
//!
//! 登录用户查询任意 IP（或自身）的地理位置，每次带 IP 的查询都记录到
//! 该用户的历史中，可批量删除。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface (user management, API client)
//!
//! # Architecture
//! - `api`: HTTP routes, JWT and middleware
//! - `services`: Lookup and auth business logic, geolocation provider
//! - `storage`: Sea-ORM storage for users, tokens and history
//! - `client`: API client and the lookup page state machine
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and signal handling

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
