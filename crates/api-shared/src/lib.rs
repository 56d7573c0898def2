//! # API Shared
//!
//! Shared utilities and definitions for the CareGraph binaries.
//!
//! Contains:
//! - Flat DTOs and the entity-to-DTO mappers (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`, the CLI and the workspace runner.

pub mod dto;
pub mod health;

pub use health::{HealthRes, HealthService};
