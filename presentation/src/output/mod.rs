//! Output formatting
//!
//! - [`ConsoleFormatter`](console::ConsoleFormatter): colored terminal text
//! - [`HostFormatter`](host::HostFormatter): HTML fragments for the wiki host
//! - [`JsonFormatter`](json::JsonFormatter): machine-readable output

pub mod console;
pub mod formatter;
pub mod host;
pub mod json;
