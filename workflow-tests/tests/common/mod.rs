//! Common test utilities for workflow integration tests.

#![allow(dead_code)]

use uuid::Uuid;

/// Login handles are unique per store, so give each test its own.
pub fn unique_handle(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().to_string()[..8])
}
