//! Core library for yoto-oauth-pkce
pub mod config;
pub mod error;
pub mod pkce;
pub mod api;
pub mod util;
