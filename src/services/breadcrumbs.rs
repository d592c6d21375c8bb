//! Breadcrumb trail for the cursor position
//!
//! [`symbol_path`] walks the outline depth-first and yields every symbol
//! whose range contains the cursor, outermost first. Subtrees of
//! non-containing symbols are skipped without being visited.

use std::iter::FusedIterator;
use std::slice;

use crate::models::{Position, Symbol};
use crate::view::{ClickAction, Element};

/// Lazy iterator over the symbols enclosing a position.
///
/// Cloning it yields an independent iterator from the same point.
#[derive(Debug, Clone)]
pub struct SymbolPath<'a> {
    position: Position,
    stack: Vec<slice::Iter<'a, Symbol>>,
}

/// Symbols on the nesting path at `position`
pub fn symbol_path(symbols: &[Symbol], position: Position) -> SymbolPath<'_> {
    SymbolPath {
        position,
        stack: vec![symbols.iter()],
    }
}

impl<'a> Iterator for SymbolPath<'a> {
    type Item = &'a Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(siblings) = self.stack.last_mut() {
            match siblings.next() {
                Some(symbol) if symbol.range.contains_position(self.position) => {
                    self.stack.push(symbol.children.iter());
                    return Some(symbol);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

impl FusedIterator for SymbolPath<'_> {}

/// One breadcrumb element per symbol, in path order
pub fn render_breadcrumbs<'a>(path: impl IntoIterator<Item = &'a Symbol>) -> Vec<Element> {
    path.into_iter().map(breadcrumb).collect()
}

fn breadcrumb(symbol: &Symbol) -> Element {
    let mut element = Element::span()
        .with_role("button")
        .with_class("breadcrumb")
        .with_text(symbol.name.as_str())
        .with_title(symbol.detail.as_str())
        .on_click(ClickAction::Reveal {
            position: symbol.start(),
        });

    if symbol.kind.is_array_like() {
        element.add_class("array");
    } else if symbol.kind.is_object_like() {
        element.add_class("object");
    }

    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Range, SymbolKind};

    fn sym(name: &str, range: Range) -> Symbol {
        Symbol::new(name, SymbolKind::Module, range)
    }

    fn line(start: u32, end: u32) -> Range {
        Range::from_coords(1, start, 1, end)
    }

    fn names<'a>(path: impl Iterator<Item = &'a Symbol>) -> Vec<&'a str> {
        path.map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_nested_chain() {
        let tree = vec![sym("A", line(0, 10)).with_children(vec![
            sym("B", line(2, 8)).with_children(vec![sym("C", line(3, 5))]),
        ])];

        assert_eq!(
            names(symbol_path(&tree, Position::new(1, 4))),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn test_siblings_both_containing() {
        let tree = vec![sym("A", line(0, 10)), sym("D", line(0, 10))];
        assert_eq!(names(symbol_path(&tree, Position::new(1, 5))), vec!["A", "D"]);
    }

    #[test]
    fn test_outside_everything_is_empty() {
        let tree = vec![sym("A", line(2, 4)), sym("B", line(6, 8))];
        assert_eq!(symbol_path(&tree, Position::new(1, 5)).count(), 0);
        assert_eq!(symbol_path(&tree, Position::new(3, 1)).count(), 0);
        assert_eq!(symbol_path(&[], Position::new(1, 1)).count(), 0);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let tree = vec![sym("A", line(2, 8)).with_children(vec![sym("B", line(4, 6))])];
        assert_eq!(names(symbol_path(&tree, Position::new(1, 2))), vec!["A"]);
        assert_eq!(names(symbol_path(&tree, Position::new(1, 4))), vec!["A", "B"]);
        assert_eq!(names(symbol_path(&tree, Position::new(1, 6))), vec!["A", "B"]);
        assert_eq!(names(symbol_path(&tree, Position::new(1, 8))), vec!["A"]);
    }

    #[test]
    fn test_non_containing_subtree_is_skipped() {
        // Malformed: the child claims a range its parent does not cover.
        let tree = vec![sym("A", line(0, 3)).with_children(vec![sym("B", line(0, 10))])];
        assert_eq!(symbol_path(&tree, Position::new(1, 5)).count(), 0);
    }

    #[test]
    fn test_malformed_child_inside_containing_parent() {
        let tree = vec![sym("A", line(0, 10)).with_children(vec![
            sym("B", line(20, 30)),
            sym("C", line(4, 6)),
        ])];
        assert_eq!(names(symbol_path(&tree, Position::new(1, 5))), vec!["A", "C"]);
    }

    #[test]
    fn test_descends_before_next_sibling() {
        let tree = vec![
            sym("A", line(0, 10)).with_children(vec![sym("A1", line(4, 6))]),
            sym("D", line(0, 10)).with_children(vec![sym("D1", line(5, 5))]),
        ];
        assert_eq!(
            names(symbol_path(&tree, Position::new(1, 5))),
            vec!["A", "A1", "D", "D1"]
        );
    }

    #[test]
    fn test_output_is_a_chain() {
        let tree = vec![
            sym("root", Range::from_coords(1, 1, 10, 1)).with_children(vec![
                sym("a", Range::from_coords(1, 1, 3, 1)),
                sym("b", Range::from_coords(4, 1, 9, 1)).with_children(vec![
                    sym("b1", Range::from_coords(5, 3, 5, 20)),
                    sym("b2", Range::from_coords(6, 3, 8, 20)),
                ]),
            ]),
        ];
        let position = Position::new(7, 4);

        let path: Vec<_> = symbol_path(&tree, position).collect();
        assert_eq!(names(path.iter().copied()), vec!["root", "b", "b2"]);
        for symbol in &path {
            assert!(symbol.range.contains_position(position));
        }
        for pair in path.windows(2) {
            assert!(pair[0].children.iter().any(|c| std::ptr::eq(c, pair[1])));
        }
    }

    #[test]
    fn test_restartable() {
        let tree = vec![sym("A", line(0, 10)).with_children(vec![sym("B", line(2, 8))])];
        let mut path = symbol_path(&tree, Position::new(1, 4));
        assert_eq!(path.next().map(|s| s.name.as_str()), Some("A"));

        let fork = path.clone();
        assert_eq!(names(path), vec!["B"]);
        assert_eq!(names(fork), vec!["B"]);
        assert_eq!(symbol_path(&tree, Position::new(1, 4)).count(), 2);
    }

    #[test]
    fn test_render_classes_and_actions() {
        let tree = vec![
            Symbol::new("root", SymbolKind::Module, line(0, 20))
                .with_detail("object")
                .with_children(vec![
                    Symbol::new("items", SymbolKind::Array, line(3, 15)).with_children(vec![
                        Symbol::new("name", SymbolKind::String, line(5, 9)).with_detail("bob"),
                    ]),
                ]),
        ];

        let crumbs = render_breadcrumbs(symbol_path(&tree, Position::new(1, 6)));
        assert_eq!(crumbs.len(), 3);

        assert!(crumbs[0].has_class("breadcrumb"));
        assert!(crumbs[0].has_class("object"));
        assert!(crumbs[1].has_class("array"));
        assert!(!crumbs[2].has_class("array"));
        assert!(!crumbs[2].has_class("object"));

        assert_eq!(crumbs[2].text.as_deref(), Some("name"));
        assert_eq!(crumbs[2].title.as_deref(), Some("bob"));
        assert_eq!(crumbs[2].role.as_deref(), Some("button"));
        assert_eq!(
            crumbs[1].on_click,
            Some(ClickAction::Reveal {
                position: Position::new(1, 3)
            })
        );
    }
}
