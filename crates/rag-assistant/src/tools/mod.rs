//! Agent Tools
//!
//! The closed three-tool set of the assistant: document search,
//! encyclopedia lookup and weather. Each implements `agent_core::Tool`
//! over a client owned by this crate.

mod document_search;
mod encyclopedia;
mod weather;

pub use document_search::DocumentSearchTool;
pub use encyclopedia::EncyclopediaTool;
pub use weather::WeatherTool;
