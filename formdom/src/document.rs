//! Arena-backed document tree.
//!
//! A [`Document`] owns every node created from an [`Element`] tree or through
//! [`Document::create_element`]. Nodes are addressed by [`NodeId`]; a node
//! without a parent is detached and invisible to tree queries until inserted.
//!
//! Besides the tree, the document records the host-side effects a browser
//! would perform (alerts, scrolling, focus) so callers can observe them.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};

use crate::element::Element;
use crate::event::{EventType, ListenerId};
use crate::focus::FocusState;

/// Handle to a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct NodeData {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    value: Option<String>,
    checked: bool,
    selected: bool,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    node: NodeId,
    event: EventType,
}

/// An in-memory HTML document.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    focus: FocusState,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
    alerts: Vec<String>,
    scrolled_to: Option<NodeId>,
}

impl Document {
    /// Build a document from an element tree. The tree root becomes the
    /// document root.
    pub fn new(root: Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            focus: FocusState::new(),
            listeners: BTreeMap::new(),
            next_listener: 0,
            alerts: Vec::new(),
            scrolled_to: None,
        };
        doc.root = doc.insert_tree(root, None);
        doc
    }

    fn insert_tree(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: element.tag,
            attributes: element.attributes,
            classes: element.classes,
            text: element.text,
            value: element.value,
            checked: element.checked,
            selected: element.selected,
            disabled: element.disabled,
            parent,
            children: Vec::new(),
        });
        for child in element.children {
            let child_id = self.insert_tree(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let node = self.nodes.get_mut(id.0);
        if node.is_none() {
            warn!("[formdom] write to unknown {id}");
        }
        node
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // -------------------------------------------------------------------------
    // Tree queries
    // -------------------------------------------------------------------------

    pub fn tag_name(&self, id: NodeId) -> &str {
        self.node(id).map(|n| n.tag.as_str()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// All descendants of `scope` in document (pre-)order, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Elements with the given tag under `scope` (the whole document when
    /// `None`), in document order.
    pub fn elements_by_tag(&self, scope: Option<NodeId>, tag: &str) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = Vec::new();
        if scope.is_none() && self.tag_name(self.root).eq_ignore_ascii_case(tag) {
            found.push(self.root);
        }
        found.extend(
            self.descendants(scope.unwrap_or(self.root))
                .into_iter()
                .filter(|id| self.tag_name(*id).eq_ignore_ascii_case(tag)),
        );
        found
    }

    /// Elements carrying `class` under `scope`, in document order.
    pub fn elements_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// First attached element whose `id` attribute matches.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Nearest ancestor (excluding `id`) with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.tag_name(node).eq_ignore_ascii_case(tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    // -------------------------------------------------------------------------
    // Attributes and classes
    // -------------------------------------------------------------------------

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        match node
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => node
                .attributes
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        self.node(id).map(|n| n.classes.as_slice()).unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if class.is_empty() || self.has_class(id, class) {
            return;
        }
        if let Some(node) = self.node_mut(id) {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Inner markup of a node, stored verbatim.
    pub fn text(&self, id: NodeId) -> &str {
        self.node(id).map(|n| n.text.as_str()).unwrap_or_default()
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            node.text = text.to_string();
        }
    }

    // -------------------------------------------------------------------------
    // Form controls
    // -------------------------------------------------------------------------

    /// The HTML `type` property of a form control, or `None` for elements
    /// that are not controls.
    pub fn control_type(&self, id: NodeId) -> Option<String> {
        match self.tag_name(id) {
            "input" => Some(
                self.attribute(id, "type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "text".to_string()),
            ),
            "textarea" => Some("textarea".to_string()),
            "select" if self.attribute(id, "multiple").is_some() => {
                Some("select-multiple".to_string())
            }
            "select" => Some("select-one".to_string()),
            "button" => Some(
                self.attribute(id, "type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "submit".to_string()),
            ),
            _ => None,
        }
    }

    /// Current value of a control.
    ///
    /// Selects report the value of their first selected option; a single
    /// select with nothing explicitly selected reports its first option.
    pub fn value(&self, id: NodeId) -> String {
        match self.tag_name(id) {
            "select" => {
                let options = self.elements_by_tag(Some(id), "option");
                let selected = options.iter().find(|o| self.is_selected(**o)).copied();
                let selected = match selected {
                    Some(option) => Some(option),
                    None if self.attribute(id, "multiple").is_none() => options.first().copied(),
                    None => None,
                };
                selected.map(|o| self.value(o)).unwrap_or_default()
            }
            "option" => self
                .attribute(id, "value")
                .unwrap_or_else(|| self.text(id))
                .to_string(),
            "textarea" => self
                .node(id)
                .and_then(|n| n.value.clone())
                .unwrap_or_else(|| self.text(id).to_string()),
            _ => self
                .node(id)
                .and_then(|n| n.value.clone())
                .or_else(|| self.attribute(id, "value").map(str::to_string))
                .unwrap_or_default(),
        }
    }

    /// Set the value of a control. For selects this selects the option with
    /// the matching value and deselects the rest.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if self.tag_name(id) == "select" {
            for option in self.elements_by_tag(Some(id), "option") {
                let matches = self.value(option) == value;
                if let Some(node) = self.node_mut(option) {
                    node.selected = matches;
                }
            }
            return;
        }
        if let Some(node) = self.node_mut(id) {
            node.value = Some(value.to_string());
        }
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.checked).unwrap_or(false)
    }

    /// Check or uncheck a control. Checking a radio button unchecks the other
    /// radios with the same name in the same form.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if checked && self.control_type(id).as_deref() == Some("radio") {
            let name = self.attribute(id, "name").map(str::to_string);
            let scope = self.closest(id, "form").unwrap_or(self.root);
            if let Some(name) = name {
                let siblings: Vec<NodeId> = self
                    .elements_by_tag(Some(scope), "input")
                    .into_iter()
                    .filter(|other| *other != id)
                    .filter(|other| self.control_type(*other).as_deref() == Some("radio"))
                    .filter(|other| self.attribute(*other, "name") == Some(name.as_str()))
                    .collect();
                for other in siblings {
                    if let Some(node) = self.node_mut(other) {
                        node.checked = false;
                    }
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.checked = checked;
        }
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.selected).unwrap_or(false)
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.disabled).unwrap_or(false)
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if let Some(node) = self.node_mut(id) {
            node.disabled = disabled;
        }
    }

    /// Controls in `form` whose `name` attribute matches, in document order.
    pub fn elements_by_name(&self, form: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(form)
            .into_iter()
            .filter(|id| self.control_type(*id).is_some())
            .filter(|id| self.attribute(*id, "name") == Some(name))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Tree edits
    // -------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        id
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|c| *c != child);
            }
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            warn!("[formdom] invalid insert of {child} into {parent}");
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Replace `old` (a child of `parent`) with `new`. Does nothing if `old`
    /// is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        if self.parent(old) != Some(parent) || new == old {
            return;
        }
        self.insert_before(parent, new, Some(old));
        self.detach(old);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    // -------------------------------------------------------------------------
    // Focus and host effects
    // -------------------------------------------------------------------------

    pub fn focus(&mut self, id: NodeId) -> bool {
        self.focus.focus(id)
    }

    pub fn blur(&mut self) -> bool {
        self.focus.blur()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Record a browser alert.
    pub fn alert(&mut self, message: &str) {
        debug!("[formdom] alert: {message}");
        self.alerts.push(message.to_string());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn scroll_to(&mut self, id: NodeId) {
        self.scrolled_to = Some(id);
    }

    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn add_listener(&mut self, node: NodeId, event: EventType) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Listener { node, event });
        id
    }

    /// Returns true if the listener was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Listeners registered on `node` for `event`, in attach order.
    pub fn listeners(&self, node: NodeId, event: EventType) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, l)| l.node == node && l.event == event)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Fire `event` at `node`, returning the listeners to invoke in order.
    pub fn fire(&self, node: NodeId, event: EventType) -> Vec<ListenerId> {
        let listeners = self.listeners(node, event);
        debug!("[formdom] {event} on {node}: {} listener(s)", listeners.len());
        listeners
    }
}
