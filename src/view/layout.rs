use super::{Element, Region};
use crate::models::Style;

pub const ROOT_ID: &str = "yaml-editor-box";
pub const BREADCRUMBS_ID: &str = "yaml-breadcrumbs";
pub const EDITOR_ID: &str = "yaml-editor";
pub const PROBLEMS_ID: &str = "yaml-problems";

/// Breadcrumbs above the editor surface, problems below it.
///
/// Each component instance owns its own regions, so two mounted editors
/// never write into each other's lists.
#[derive(Clone)]
pub struct Layout {
    breadcrumbs: Region,
    problems: Region,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        Self {
            breadcrumbs: Region::new(Element::div().with_id(BREADCRUMBS_ID)),
            problems: Region::new(Element::div().with_id(PROBLEMS_ID)),
        }
    }

    pub fn breadcrumbs(&self) -> &Region {
        &self.breadcrumbs
    }

    pub fn problems(&self) -> &Region {
        &self.problems
    }

    /// Current tree, with `style` merged over the default editor size
    pub fn render(&self, style: &Style) -> Element {
        let editor = Element::div()
            .with_id(EDITOR_ID)
            .with_style(Style::editor_default().merged(style));

        Element::div().with_id(ROOT_ID).with_children(vec![
            self.breadcrumbs.snapshot(),
            editor,
            self.problems.snapshot(),
        ])
    }
}
