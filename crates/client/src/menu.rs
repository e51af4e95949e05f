//! Menu tree building
//!
//! Converts a flat ordered list of menu links into a nested tree by
//! parent reference. A cyclic parent chain is a backend data-integrity
//! precondition violation; recursion is bounded by [`MAX_MENU_DEPTH`] so
//! malformed data truncates with a warning instead of looping.

use tracing::warn;

use quarry_jsonapi::MenuLink;

/// Maximum nesting depth before tree building truncates
pub const MAX_MENU_DEPTH: usize = 64;

/// Build a nested tree from flat links, rooted at `parent_id`.
///
/// The empty string is the root sentinel. Returns an empty forest for
/// empty input. Input ordering within each level is preserved.
#[must_use]
pub fn build_menu_tree(links: &[MenuLink], parent_id: &str) -> Vec<MenuLink> {
    build_level(links, parent_id, 0)
}

fn build_level(links: &[MenuLink], parent_id: &str, depth: usize) -> Vec<MenuLink> {
    if depth >= MAX_MENU_DEPTH {
        warn!(parent = %parent_id, "menu tree exceeds maximum depth, truncating");
        return Vec::new();
    }

    links
        .iter()
        .filter(|link| link.parent == parent_id)
        .map(|link| {
            let mut link = link.clone();
            link.items = build_level(links, &link.id, depth + 1);
            link
        })
        .collect()
}
