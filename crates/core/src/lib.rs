//! Directory tree rendering with configurable exclusions.

pub mod config;
pub mod error;
pub mod tree;

pub use config::{Settings, TreeConfig};
pub use error::{Result, TreeError};
pub use tree::{TreeLines, TreePrinter, TreeStats};
