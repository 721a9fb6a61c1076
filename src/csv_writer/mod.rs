//! CSV output: UTF-8 BOM, fixed header, one `;`-separated row per test case.
//!
//! Fields containing `;`, a line break or `"` are quoted and inner quotes
//! doubled. Everything else is written as is.

use anyhow::Result;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::model::TestCase;

pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub const HEADER: [&str; 16] = [
    "name",
    "full_name",
    "description",
    "precondition",
    "expected_result",
    "scenario",
    "tag",
    "link",
    "parameter",
    "Lead",
    "Owner",
    "Suite",
    "Component",
    "Story",
    "Feature",
    "Epic",
];

pub fn write_test_cases(test_cases: &[TestCase]) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(4096);
    buffer.extend_from_slice(&UTF8_BOM);

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);

    writer.write_record(HEADER)?;
    for test_case in test_cases {
        writer.write_record(test_case.to_row())?;
    }

    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}
