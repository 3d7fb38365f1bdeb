//! # Client Manager Testing Utils
//!
//! Shared testing utilities for the client manager service.
//! This crate provides in-memory mock implementations of the repository
//! and cache traits, test containers, and test data builders that can be
//! used across all other crates in the workspace.
//!
//! ## Features
//!
//! - **Mock Repositories**: In-memory implementations of all repository traits
//! - **Mock Cache**: TTL-aware in-memory cache with failure injection
//! - **Test Containers**: PostgreSQL and Redis containers for integration tests
//! - **Test Data Builders**: Utilities for creating test data
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! client-manager-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! Then use the mocks in your tests:
//!
//! ```rust,ignore
//! use client_manager_testing_utils::mocks::*;
//! use client_manager_testing_utils::containers::PostgresTestContainer;
//! ```

pub mod builders;
pub mod containers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use containers::*;
pub use mocks::*;
