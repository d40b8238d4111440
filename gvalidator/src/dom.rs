//! The DOM collaborator.
//!
//! [`Dom`] is the whole surface the validator needs from a page: tree
//! queries, class and value access, element creation, focus, alerts and
//! listener registration. Listeners carry no callback; the host fires them
//! back into [`ValidationSession::dispatch`](crate::ValidationSession::dispatch).

use std::fmt::Debug;
use std::hash::Hash;

use formdom::{Document, ListenerId, NodeId};

pub use formdom::EventType;

pub trait Dom {
    /// Handle to one element.
    type Node: Copy + Eq + Hash + Debug;
    /// Handle to one registered listener.
    type Listener: Copy + Eq + Hash + Debug;

    // Queries
    /// Elements with `tag` under `scope` (the whole page when `None`), in
    /// document order.
    fn elements_by_tag(&self, scope: Option<Self::Node>, tag: &str) -> Vec<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn tag_name(&self, node: Self::Node) -> String;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    /// The HTML `type` property (`text`, `checkbox`, `select-one`, ...), or
    /// `None` for non-controls.
    fn control_type(&self, node: Self::Node) -> Option<String>;

    // Classes
    fn classes(&self, node: Self::Node) -> Vec<String>;
    fn add_class(&mut self, node: Self::Node, class: &str);
    fn remove_class(&mut self, node: Self::Node, class: &str);

    fn has_class(&self, node: Self::Node, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    // Values and content
    fn value(&self, node: Self::Node) -> String;
    fn set_value(&mut self, node: Self::Node, value: &str);
    fn is_checked(&self, node: Self::Node) -> bool;
    fn is_disabled(&self, node: Self::Node) -> bool;
    fn set_disabled(&mut self, node: Self::Node, disabled: bool);
    fn inner_html(&self, node: Self::Node) -> String;
    fn set_inner_html(&mut self, node: Self::Node, html: &str);

    // Tree edits
    fn create_element(&mut self, tag: &str) -> Self::Node;
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);
    /// Insert before `reference`, or append when `reference` is `None`.
    fn insert_before(&mut self, parent: Self::Node, child: Self::Node, reference: Option<Self::Node>);
    fn replace_child(&mut self, parent: Self::Node, new: Self::Node, old: Self::Node);

    // Host
    fn focus(&mut self, node: Self::Node);
    fn alert(&mut self, message: &str);
    fn scroll_to(&mut self, node: Self::Node);

    // Events
    fn add_listener(&mut self, node: Self::Node, event: EventType) -> Self::Listener;
    fn remove_listener(&mut self, listener: Self::Listener);
    /// Listeners on `node` for `event`, in attach order.
    fn listeners(&self, node: Self::Node, event: EventType) -> Vec<Self::Listener>;

    /// First descendant of `scope` with the given tag and class.
    fn find_with_class(&self, scope: Self::Node, tag: &str, class: &str) -> Option<Self::Node> {
        self.elements_by_tag(Some(scope), tag)
            .into_iter()
            .find(|node| self.has_class(*node, class))
    }

    /// Inputs under `scope` sharing the `name` attribute, i.e. a checkbox or
    /// radio group.
    fn inputs_named(&self, scope: Self::Node, name: &str) -> Vec<Self::Node> {
        self.elements_by_tag(Some(scope), "input")
            .into_iter()
            .filter(|node| self.attribute(*node, "name").as_deref() == Some(name))
            .collect()
    }
}

impl Dom for Document {
    type Node = NodeId;
    type Listener = ListenerId;

    fn elements_by_tag(&self, scope: Option<NodeId>, tag: &str) -> Vec<NodeId> {
        Document::elements_by_tag(self, scope, tag)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        Document::element_by_id(self, id)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        Document::first_child(self, node)
    }

    fn tag_name(&self, node: NodeId) -> String {
        Document::tag_name(self, node).to_string()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        Document::attribute(self, node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        Document::set_attribute(self, node, name, value);
    }

    fn control_type(&self, node: NodeId) -> Option<String> {
        Document::control_type(self, node)
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        Document::classes(self, node).to_vec()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        Document::has_class(self, node, class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        Document::add_class(self, node, class);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        Document::remove_class(self, node, class);
    }

    fn value(&self, node: NodeId) -> String {
        Document::value(self, node)
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        Document::set_value(self, node, value);
    }

    fn is_checked(&self, node: NodeId) -> bool {
        Document::is_checked(self, node)
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        Document::is_disabled(self, node)
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        Document::set_disabled(self, node, disabled);
    }

    fn inner_html(&self, node: NodeId) -> String {
        Document::text(self, node).to_string()
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        Document::set_text(self, node, html);
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        Document::create_element(self, tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Document::append_child(self, parent, child);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        Document::insert_before(self, parent, child, reference);
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        Document::replace_child(self, parent, new, old);
    }

    fn focus(&mut self, node: NodeId) {
        Document::focus(self, node);
    }

    fn alert(&mut self, message: &str) {
        Document::alert(self, message);
    }

    fn scroll_to(&mut self, node: NodeId) {
        Document::scroll_to(self, node);
    }

    fn add_listener(&mut self, node: NodeId, event: EventType) -> ListenerId {
        Document::add_listener(self, node, event)
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        Document::remove_listener(self, listener);
    }

    fn listeners(&self, node: NodeId, event: EventType) -> Vec<ListenerId> {
        Document::listeners(self, node, event)
    }
}
