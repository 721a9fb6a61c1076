//! Renders `<mockData>` blocks into the precondition text.
//!
//! ```text
//! <mockData>
//!   <query method="get">/users/${id}</query>
//!   <response status="200">{"name":"Ann"}</response>
//!   <parameters><id>42</id><lang>ru</lang></parameters>
//! </mockData>
//! ```
//!
//! becomes `1. **GET** /users/42?lang=ru` followed by the status and the
//! pretty-printed body.

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::json::format_json;
use crate::loader::XmlElement;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder regex"));

/// One recorded HTTP interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockData {
    pub method: String,
    pub url: String,
    pub status: String,
    pub body: String,
    pub parameters: Vec<(String, String)>,
}

impl MockData {
    /// Reads `query`, `response` and the optional `parameters` of a `<mockData>`.
    pub fn from_element(element: &XmlElement) -> Result<Self> {
        let query = element
            .first_descendant("query")
            .ok_or_else(|| anyhow!("<mockData> has no <query>"))?;
        let response = element
            .first_descendant("response")
            .ok_or_else(|| anyhow!("<mockData> has no <response>"))?;

        let parameters = element
            .first_descendant("parameters")
            .map(|params| {
                params
                    .elements()
                    .map(|param| (param.name.clone(), param.trimmed_text()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            method: query.attribute_or_empty("method").to_string(),
            url: query.trimmed_text(),
            status: response.attribute_or_empty("status").to_string(),
            body: response.trimmed_text(),
            parameters,
        })
    }

    /// URL with `${name}` placeholders filled in. Parameters without a
    /// placeholder are appended as a query string.
    pub fn processed_url(&self) -> String {
        let placeholders: Vec<&str> = PLACEHOLDER_RE
            .captures_iter(&self.url)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        let mut url = PLACEHOLDER_RE
            .replace_all(&self.url, |caps: &Captures<'_>| {
                let name = &caps[1];
                self.parameters
                    .iter()
                    .find(|(param, _)| param == name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();

        for (name, value) in &self.parameters {
            if placeholders.contains(&name.as_str()) {
                continue;
            }
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(name);
            url.push('=');
            url.push_str(value);
        }

        url
    }

    /// Markdown block for this mock, numbered from 1.
    pub fn render(&self, number: usize) -> String {
        format!(
            "{}. **{}** {}\n**Статус:** {} \n**Ответ:** \n`{}`\n",
            number,
            self.method.to_uppercase(),
            self.processed_url(),
            self.status,
            format_json(&self.body),
        )
    }
}

/// Renders one `<mockData>` element.
pub fn render_mock_data(element: &XmlElement, number: usize) -> Result<String> {
    let mock = MockData::from_element(element).map_err(|err| anyhow!("mockData #{number}: {err}"))?;
    Ok(mock.render(number))
}

/// Precondition text for a test case: every `<mockData>` inside it, joined by newlines.
pub fn render_preconditions(test_case: &XmlElement) -> Result<String> {
    let rendered = test_case
        .descendants("mockData")
        .into_iter()
        .enumerate()
        .map(|(index, mock)| render_mock_data(mock, index + 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join("\n"))
}
