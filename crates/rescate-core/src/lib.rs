//! Rescate Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Rescate entitlement engine. It includes:
//!
//! - Domain models (Subscriber, Plan, ServiceUsage, limits payloads, Alert)
//! - Collaborator traits for usage mutation and expansion requests
//! - Unified error handling
//! - Application and policy configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::{AppConfig, EntitlementConfig};
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
