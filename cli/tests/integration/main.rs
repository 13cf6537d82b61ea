//! Integration tests for the podctl binary
//!
//! Every test runs the real binary against a temporary `PODCTL_HOME`.

mod provider_tests;
mod workload_tests;
