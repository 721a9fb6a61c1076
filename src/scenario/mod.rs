//! Renders steps into the human-readable `scenario` column.
//!
//! ```text
//! [step 1] Отправить запрос:
//!     [step 1.1] {"query": "hi"}
//!     [expected 1.1] Expected Result
//!         [expected.step 1.1.1] state = 'greet'
//! ```

use std::fmt::Write;

use crate::formatters::format_json;
use crate::model::Step;

pub fn render_scenario(steps: &[Step]) -> String {
    let mut out = String::new();
    for (index, step) in steps.iter().enumerate() {
        render_step(&mut out, index + 1, step);
    }
    out.trim_end().to_string()
}

fn render_step(out: &mut String, number: usize, step: &Step) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "[step {number}] {}", step.description());

    for (j, sub_step) in step.sub_steps.iter().enumerate() {
        let _ = writeln!(out, "\t[step {number}.{}] {}", j + 1, format_json(sub_step));
    }

    if step.has_expected_results() {
        let _ = writeln!(out, "\t[expected {number}.1] Expected Result");
        for (j, result) in step.expected_results.iter().enumerate() {
            let _ = writeln!(
                out,
                "\t\t[expected.step {number}.1.{}] {}",
                j + 1,
                format_json(&result.format())
            );
        }
    }
}
