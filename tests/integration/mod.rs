//! Integration tests for sqlquill.

pub mod pipeline_test;
pub mod postgres_test;
