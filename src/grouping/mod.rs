//! Groups the children of a `<test-case>` into steps.
//!
//! A single pass over the direct element children. Step elements (`event`,
//! `request`, `q`) open a new step; result elements (`a`, `responseData`)
//! attach to the step currently open. Everything else is skipped.
//!
//! ```text
//! <q/> <a/> <a/> <event/> <responseData/>
//! └── step 1 (2 results) ┘ └── step 2 (1 result) ┘
//! ```

use tracing::warn;

use crate::loader::XmlElement;
use crate::model::{ExpectedResult, Step, StepAttributes};

/// What one child element means to the grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    Step(StepAttributes),
    Results(Vec<ExpectedResult>),
    Ignored,
}

/// Classifies a child element of `<test-case>`.
pub fn classify(element: &XmlElement) -> ChildKind {
    let text = element.trimmed_text();

    if let Some(attributes) = StepAttributes::from_element(&element.name, text.clone()) {
        return ChildKind::Step(attributes);
    }

    match element.name.as_str() {
        "a" => {
            let state = element.attribute_or_empty("state").to_string();
            if state.is_empty() && text.is_empty() {
                return ChildKind::Results(Vec::new());
            }
            ChildKind::Results(vec![ExpectedResult::BotReply {
                state,
                bot_response: text,
            }])
        }
        "responseData" => ChildKind::Results(vec![ExpectedResult::ResponseField {
            field: element.attribute_or_empty("field").to_string(),
            value: text,
        }]),
        _ => ChildKind::Ignored,
    }
}

/// Reducer state: no step yet, or a step collecting results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Idle,
    Accumulating {
        attributes: StepAttributes,
        results: Vec<ExpectedResult>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub completed: Vec<Step>,
    pub pending: Pending,
}

impl Default for Grouping {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            pending: Pending::Idle,
        }
    }
}

impl Grouping {
    /// Applies one classified child.
    pub fn apply(mut self, kind: ChildKind) -> Self {
        match (kind, self.pending) {
            (ChildKind::Step(attributes), pending) => {
                if let Pending::Accumulating { attributes: open, results } = pending {
                    self.completed.push(Step::new(open, results));
                }
                self.pending = Pending::Accumulating {
                    attributes,
                    results: Vec::new(),
                };
            }
            (ChildKind::Results(new), Pending::Accumulating { attributes, mut results }) => {
                results.extend(new);
                self.pending = Pending::Accumulating { attributes, results };
            }
            (ChildKind::Results(new), Pending::Idle) => {
                if !new.is_empty() {
                    warn!(count = new.len(), "expected result before any step, ignored");
                }
                self.pending = Pending::Idle;
            }
            (ChildKind::Ignored, pending) => {
                self.pending = pending;
            }
        }
        self
    }

    /// Closes the open step, if any.
    pub fn finish(mut self) -> Vec<Step> {
        if let Pending::Accumulating { attributes, results } = self.pending {
            self.completed.push(Step::new(attributes, results));
        }
        self.completed
    }
}

/// Produces the ordered steps of one `<test-case>`.
pub fn group_steps(test_case: &XmlElement) -> Vec<Step> {
    test_case
        .elements()
        .map(classify)
        .fold(Grouping::default(), Grouping::apply)
        .finish()
}
