//! sqlquill - ask questions about your database in plain language.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod render;
pub mod repl;
pub mod sql;
