//! # Gatewayエンドポイント

pub mod service;
pub mod transfer;


pub use service::{handle_health, handle_index, handle_not_found};
pub use transfer::handle_transfer;
