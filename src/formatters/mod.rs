// Module: Formatters
// Pure text transforms used while rendering a test case.

pub mod json;
pub mod mock;

pub use json::format_json;
pub use mock::{render_mock_data, render_preconditions, MockData};
