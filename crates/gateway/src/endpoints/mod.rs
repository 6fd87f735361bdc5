//! # Gatewayエンドポイント

pub mod api;
pub mod healthy;
pub mod info;

pub use api::{handle_api, REMOTE_USER_HEADER};
pub use healthy::handle_healthy;
pub use info::handle_info;
