//! Converts the test-case XML dialect into a `;`-separated CSV for import
//! into a test-management tool.
//!
//! ```ignore
//! let params = ConversionParams::default().with_file_name("bot.xml");
//! let csv = converter::convert(xml_bytes, &params)?;
//! ```

pub mod config;
pub mod converter;
pub mod csv_writer;
pub mod errors;
pub mod formatters;
pub mod grouping;
pub mod loader;
pub mod model;
pub mod scenario;
pub mod telemetry;
pub mod validation;

pub use config::{ConversionParams, Metadata};
pub use converter::{convert, convert_str, load_and_validate, output_file_name};
pub use errors::{ConversionError, ErrorCode};
