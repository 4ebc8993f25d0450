// Common test utilities and fixtures

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{project_store, research_store, write_file_bytes};
#[allow(unused_imports)]
pub use helpers::{assert_complete, create_test_env, create_test_env_with, FixedTool, TestEnv};
