//! Traversal state threaded through the recursive descent.

/// Table section an element is nested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSection {
    Head,
    Body,
}

impl TableSection {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "thead" => Some(TableSection::Head),
            "tbody" => Some(TableSection::Body),
            _ => None,
        }
    }
}

/// Context carried from a parent to its children.
///
/// The value is `Copy`: every descent works on its own copy, so a sibling
/// subtree can never observe another sibling's changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalContext {
    /// Nesting depth of the innermost list, `-1` outside of any list.
    pub list_depth: i32,
    pub list_ordered: bool,
    /// Index of the current list item within its list, `-1` before the first.
    pub list_item_index: i32,
    /// Whether the current subtree is inside an `svg` element.
    pub svg: bool,
    pub table_section: Option<TableSection>,
}

impl TraversalContext {
    pub fn root() -> Self {
        Self {
            list_depth: -1,
            list_ordered: false,
            list_item_index: -1,
            svg: false,
            table_section: None,
        }
    }

    pub fn in_table_head(&self) -> bool {
        self.table_section == Some(TableSection::Head)
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::root()
    }
}
