//! Terminal UI for Model Sliding
//!
//! Progressive reply rendering, styling and the routing help table.

pub mod sink;
pub mod table;
pub mod theme;

pub use sink::TerminalSink;
pub use table::help_table;
pub use theme::ChatTheme;
