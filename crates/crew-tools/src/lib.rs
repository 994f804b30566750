//! Tool management and execution framework for financial-crew
//!
//! Tools are the functions crew agents may call while working on a task.
//! Besides the [`Tool`] trait and [`ToolRegistry`], this crate ships the two
//! web tools every analyst agent carries: internet search and website reading.

pub mod error;
pub mod registry;
pub mod scrape;
pub mod search;
pub mod tool;

pub use error::WebToolError;
pub use registry::ToolRegistry;
pub use scrape::ScrapeWebsiteTool;
pub use search::SerperSearchTool;
pub use tool::Tool;
