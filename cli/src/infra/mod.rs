//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the provider's GraphQL API,
//! local state files, and `ssh`/`scp` process execution.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod graphql;
pub mod paths;
pub mod registry_store;
pub mod ssh;
