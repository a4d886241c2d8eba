//! quietrun library - exposes modules for the binary and for tests

pub mod app;
pub mod commands;
