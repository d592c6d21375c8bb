//! Problems panel projection
//!
//! Turns one document's marker batch into the ordered list shown below the
//! editor, plus the pass/fail signal reported to the host.

use serde::Serialize;

use crate::models::{Marker, MarkerSeverity, Position};
use crate::view::{ClickAction, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemClass {
    Warning,
    /// Errors and anything else that is not a hint or a warning
    Error,
}

impl ProblemClass {
    fn icon(self) -> &'static str {
        match self {
            Self::Warning => "codicon-warning",
            Self::Error => "codicon-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub class: ProblemClass,
    pub message: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemList {
    pub entries: Vec<Problem>,
    pub has_error: bool,
}

impl ProblemList {
    pub fn outcome(&self) -> Validation {
        if self.has_error {
            Validation::Failed
        } else {
            Validation::Passed
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Project a marker batch, preserving its order. Hints are dropped.
pub fn project(markers: &[Marker]) -> ProblemList {
    let entries: Vec<Problem> = markers
        .iter()
        .filter(|m| m.severity != MarkerSeverity::Hint)
        .map(|m| Problem {
            class: if m.severity == MarkerSeverity::Warning {
                ProblemClass::Warning
            } else {
                ProblemClass::Error
            },
            message: m.message.clone(),
            position: m.start,
        })
        .collect();

    ProblemList {
        has_error: !entries.is_empty(),
        entries,
    }
}

pub fn render_problems(list: &ProblemList) -> Vec<Element> {
    list.entries.iter().map(problem_element).collect()
}

fn problem_element(problem: &Problem) -> Element {
    let icon = Element::div()
        .with_class("codicon")
        .with_class(problem.class.icon());
    let text = Element::div()
        .with_class("problem-text")
        .with_text(problem.message.as_str());

    Element::div()
        .with_role("button")
        .with_class("problem")
        .on_click(ClickAction::Reveal {
            position: problem.position,
        })
        .with_children(vec![icon, text])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentUri;

    fn marker(severity: MarkerSeverity, message: &str, line: u32, column: u32) -> Marker {
        Marker::new(
            DocumentUri::new("file:///doc.yaml"),
            severity,
            message,
            Position::new(line, column),
        )
    }

    #[test]
    fn test_empty_batch_passes() {
        let list = project(&[]);
        assert!(list.is_empty());
        assert!(!list.has_error);
        assert_eq!(list.outcome(), Validation::Passed);
        assert!(render_problems(&list).is_empty());
    }

    #[test]
    fn test_hints_only_pass() {
        let list = project(&[
            marker(MarkerSeverity::Hint, "a", 1, 1),
            marker(MarkerSeverity::Hint, "b", 2, 1),
        ]);
        assert!(list.is_empty());
        assert_eq!(list.outcome(), Validation::Passed);
    }

    #[test]
    fn test_classification_and_order() {
        let list = project(&[
            marker(MarkerSeverity::Warning, "W", 1, 1),
            marker(MarkerSeverity::Hint, "H", 2, 1),
            marker(MarkerSeverity::Error, "E", 3, 5),
            marker(MarkerSeverity::Info, "I", 4, 2),
        ]);

        let classes: Vec<_> = list.entries.iter().map(|p| (p.class, p.message.as_str())).collect();
        assert_eq!(
            classes,
            vec![
                (ProblemClass::Warning, "W"),
                (ProblemClass::Error, "E"),
                (ProblemClass::Error, "I"),
            ]
        );
        assert_eq!(list.entries[1].position, Position::new(3, 5));
        assert!(list.has_error);
        assert_eq!(list.outcome(), Validation::Failed);
    }

    #[test]
    fn test_warning_alone_fails_validation() {
        let list = project(&[marker(MarkerSeverity::Warning, "careful", 1, 1)]);
        assert_eq!(list.outcome(), Validation::Failed);
    }

    #[test]
    fn test_render_structure() {
        let list = project(&[marker(MarkerSeverity::Warning, "Incorrect type", 2, 6)]);
        let rendered = render_problems(&list);
        assert_eq!(rendered.len(), 1);

        let row = &rendered[0];
        assert!(row.has_class("problem"));
        assert_eq!(row.role.as_deref(), Some("button"));
        assert_eq!(
            row.on_click,
            Some(ClickAction::Reveal {
                position: Position::new(2, 6)
            })
        );
        assert!(row.children[0].has_class("codicon"));
        assert!(row.children[0].has_class("codicon-warning"));
        assert!(row.children[1].has_class("problem-text"));
        assert_eq!(row.text_content(), "Incorrect type");
    }

    #[test]
    fn test_error_icon() {
        let list = project(&[marker(MarkerSeverity::Error, "bad", 1, 1)]);
        let rendered = render_problems(&list);
        assert!(rendered[0].children[0].has_class("codicon-error"));
    }
}
