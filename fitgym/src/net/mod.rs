//! Networking components for talking to the remote gym service.

pub mod client;
pub mod interceptor;
pub mod messages;

pub use client::{ApiClient, AuthApi};
pub use interceptor::{AuthFailureInterceptor, Navigator};
