pub mod error;
pub mod health_service;
pub mod validation;
pub mod warp;
