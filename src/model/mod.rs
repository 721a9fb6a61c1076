//! Test-case model: steps, expected results and the assembled test case.

use crate::config::Metadata;

/// Prefix of the `full_name` column.
pub const FULL_NAME_PREFIX: &str = "JAICP ";

/// Prefix of the suite value derived from the file name.
pub const SUITE_PREFIX: &str = "JIACP";

/// What a step does. Built from one `<event>`, `<request>` or `<q>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAttributes {
    Event(String),
    Request(String),
    Question(String),
}

impl StepAttributes {
    pub fn is_step_element(name: &str) -> bool {
        matches!(name, "event" | "request" | "q")
    }

    /// Builds attributes from a tag name and its trimmed text; `None` for non-step tags.
    pub fn from_element(name: &str, content: impl Into<String>) -> Option<Self> {
        match name {
            "event" => Some(Self::Event(content.into())),
            "request" => Some(Self::Request(content.into())),
            "q" => Some(Self::Question(content.into())),
            _ => None,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Event(event) => format!("Вызвать ивент:\n{event}"),
            Self::Request(_) => "Отправить запрос:".to_string(),
            Self::Question(question) => format!("Отправить текст в бота:\n{question}"),
        }
    }

    /// Only requests carry a sub-step: the request body.
    pub fn sub_steps(&self) -> Vec<String> {
        match self {
            Self::Request(body) => vec![body.clone()],
            _ => Vec::new(),
        }
    }
}

/// One assertion attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedResult {
    /// From `<a state="...">reply</a>`.
    BotReply { state: String, bot_response: String },
    /// From `<responseData field="...">value</responseData>`.
    ResponseField { field: String, value: String },
}

impl ExpectedResult {
    pub fn is_result_element(name: &str) -> bool {
        matches!(name, "a" | "responseData")
    }

    pub fn format(&self) -> String {
        match self {
            Self::ResponseField { field, value } if field == "replies" => {
                format!("Ожидаемое тело:\n{value}")
            }
            Self::ResponseField { field, value } if value.is_empty() => {
                format!("Ключ {field} не равен NULL/существует в ответе")
            }
            Self::ResponseField { field, value } => {
                format!("Элемент тела\n {field}\nимеет значение\n{value}")
            }
            Self::BotReply { state, bot_response } => {
                let mut parts = Vec::with_capacity(2);
                if !state.is_empty() {
                    parts.push(format!("state = '{state}'"));
                }
                if !bot_response.is_empty() {
                    parts.push(format!("Ответ бота:\n{bot_response}"));
                }
                parts.join("\n")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub attributes: StepAttributes,
    pub sub_steps: Vec<String>,
    pub expected_results: Vec<ExpectedResult>,
}

impl Step {
    pub fn new(attributes: StepAttributes, expected_results: Vec<ExpectedResult>) -> Self {
        let sub_steps = attributes.sub_steps();
        Self {
            attributes,
            sub_steps,
            expected_results,
        }
    }

    pub fn has_sub_steps(&self) -> bool {
        !self.sub_steps.is_empty()
    }

    pub fn has_expected_results(&self) -> bool {
        !self.expected_results.is_empty()
    }

    pub fn description(&self) -> String {
        self.attributes.description()
    }

    pub fn last_expected_result(&self) -> Option<&ExpectedResult> {
        self.expected_results.last()
    }
}

/// A rendered test case, ready to become one CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub precondition: String,
    pub steps: Vec<Step>,
    pub file_name: Option<String>,
    pub metadata: Metadata,
}

impl TestCase {
    pub fn full_name(&self) -> String {
        format!("{FULL_NAME_PREFIX}{}", self.name)
    }

    /// Last expected result of the last step that has any.
    pub fn final_expected_result(&self) -> String {
        self.steps
            .iter()
            .rev()
            .find_map(Step::last_expected_result)
            .map(ExpectedResult::format)
            .unwrap_or_default()
    }

    pub fn scenario(&self) -> String {
        crate::scenario::render_scenario(&self.steps)
    }

    pub fn suite_value(&self) -> String {
        if !self.metadata.suite.is_empty() {
            return self.metadata.suite.clone();
        }
        self.file_stem()
            .map(|stem| format!("{SUITE_PREFIX}{stem}"))
            .unwrap_or_default()
    }

    pub fn story_value(&self) -> String {
        if !self.metadata.story.is_empty() {
            return self.metadata.story.clone();
        }
        self.file_stem().map(str::to_string).unwrap_or_default()
    }

    fn file_stem(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(file_stem)
    }

    /// The 16 CSV columns, in header order.
    pub fn to_row(&self) -> [String; 16] {
        let m = &self.metadata;
        [
            self.name.clone(),
            self.full_name(),
            String::new(),
            self.precondition.clone(),
            self.final_expected_result(),
            self.scenario(),
            m.tag.clone(),
            m.link.clone(),
            m.parameter.clone(),
            m.lead.clone(),
            m.owner.clone(),
            self.suite_value(),
            m.component.clone(),
            self.story_value(),
            m.feature.clone(),
            m.epic.clone(),
        ]
    }
}

/// File name without its last extension. A leading dot is not an extension.
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(state: &str, text: &str) -> ExpectedResult {
        ExpectedResult::BotReply {
            state: state.to_string(),
            bot_response: text.to_string(),
        }
    }

    fn field(name: &str, value: &str) -> ExpectedResult {
        ExpectedResult::ResponseField {
            field: name.to_string(),
            value: value.to_string(),
        }
    }

    fn test_case(steps: Vec<Step>, file_name: Option<&str>, metadata: Metadata) -> TestCase {
        TestCase {
            name: "greeting".to_string(),
            precondition: String::new(),
            steps,
            file_name: file_name.map(str::to_string),
            metadata,
        }
    }

    #[test]
    fn test_step_attributes_from_element() {
        assert_eq!(
            StepAttributes::from_element("q", "Hello"),
            Some(StepAttributes::Question("Hello".to_string()))
        );
        assert_eq!(StepAttributes::from_element("a", "x"), None);
        assert!(StepAttributes::is_step_element("request"));
        assert!(!StepAttributes::is_step_element("responseData"));
    }

    #[test]
    fn test_only_requests_have_sub_steps() {
        let request = Step::new(StepAttributes::Request("{\"a\":1}".to_string()), vec![]);
        let event = Step::new(StepAttributes::Event("start".to_string()), vec![]);

        assert!(request.has_sub_steps());
        assert_eq!(request.sub_steps, vec!["{\"a\":1}".to_string()]);
        assert!(!event.has_sub_steps());
        assert_eq!(request.description(), "Отправить запрос:");
        assert_eq!(event.description(), "Вызвать ивент:\nstart");
    }

    #[test]
    fn test_expected_result_formats() {
        assert_eq!(reply("greet", "Hi there").format(), "state = 'greet'\nОтвет бота:\nHi there");
        assert_eq!(reply("", "Hi").format(), "Ответ бота:\nHi");
        assert_eq!(reply("greet", "").format(), "state = 'greet'");
        assert_eq!(field("replies", "[]").format(), "Ожидаемое тело:\n[]");
        assert_eq!(field("status", "").format(), "Ключ status не равен NULL/существует в ответе");
        assert_eq!(field("code", "200").format(), "Элемент тела\n code\nимеет значение\n200");
    }

    #[test]
    fn test_final_expected_result_walks_backwards() {
        let steps = vec![
            Step::new(StepAttributes::Question("a".to_string()), vec![reply("s1", ""), reply("s2", "")]),
            Step::new(StepAttributes::Question("b".to_string()), vec![]),
        ];
        let tc = test_case(steps, None, Metadata::default());
        assert_eq!(tc.final_expected_result(), "state = 's2'");

        let empty = test_case(
            vec![Step::new(StepAttributes::Event("e".to_string()), vec![])],
            None,
            Metadata::default(),
        );
        assert_eq!(empty.final_expected_result(), "");
    }

    #[test]
    fn test_suite_and_story_fall_back_to_file_name() {
        let tc = test_case(vec![], Some("booking.flow.xml"), Metadata::default());
        assert_eq!(tc.suite_value(), "JIACPbooking.flow");
        assert_eq!(tc.story_value(), "booking.flow");

        let no_file = test_case(vec![], None, Metadata::default());
        assert_eq!(no_file.suite_value(), "");
        assert_eq!(no_file.story_value(), "");
    }

    #[test]
    fn test_explicit_suite_and_story_win() {
        let metadata = Metadata {
            suite: "Payments".to_string(),
            story: "Refunds".to_string(),
            ..Default::default()
        };
        let tc = test_case(vec![], Some("cases.xml"), metadata);
        assert_eq!(tc.suite_value(), "Payments");
        assert_eq!(tc.story_value(), "Refunds");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("cases.xml"), "cases");
        assert_eq!(file_stem("cases"), "cases");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_row_has_sixteen_fields_in_order() {
        let metadata = Metadata {
            tag: "smoke".to_string(),
            epic: "JAICP".to_string(),
            ..Default::default()
        };
        let tc = test_case(
            vec![Step::new(StepAttributes::Question("Hello".to_string()), vec![])],
            Some("cases.xml"),
            metadata,
        );

        let row = tc.to_row();
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], "greeting");
        assert_eq!(row[1], "JAICP greeting");
        assert_eq!(row[2], "");
        assert_eq!(row[5], "[step 1] Отправить текст в бота:\nHello");
        assert_eq!(row[6], "smoke");
        assert_eq!(row[11], "JIACPcases");
        assert_eq!(row[13], "cases");
        assert_eq!(row[15], "JAICP");
    }
}
