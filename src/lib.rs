#![forbid(unsafe_code)]

pub mod config;
pub mod datamodel;
pub mod format;
pub mod loader;
pub mod parsing;
pub mod pipeline;
