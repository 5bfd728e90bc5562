pub mod api;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod files;
pub mod metadata;
pub mod ui;
pub mod xml;

pub use error::{Result, ToolError};
