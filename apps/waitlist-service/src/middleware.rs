//! # ミドルウェア
//!
//! Waitlist Service 用のミドルウェアを提供する。

mod cors;
mod preflight;

pub use cors::cors_layer;
pub use preflight::no_content_preflight;
