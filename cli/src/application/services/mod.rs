//! Application services: use-case orchestration.
//!
//! Services depend on port traits from `crate::application::ports` and types
//! from `crate::domain`. Never on `crate::infra`, `crate::commands`, or
//! `crate::output`.

pub mod auto_terminate;
pub mod config_service;
pub mod exit_guard;
pub mod orchestrator;
pub mod pod_admin;
pub mod readiness;
pub mod registry;
