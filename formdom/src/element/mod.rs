mod node;

pub use node::Element;

/// Find an element by its `id` attribute in the tree.
pub fn find_element<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.attr_value("id") == Some(id) {
        return Some(root);
    }

    for child in &root.children {
        if let Some(found) = find_element(child, id) {
            return Some(found);
        }
    }

    None
}
