//! Inline feedback: message span, status icon, required marker and the
//! per-state rendering of all three.

use log::warn;

use super::FieldState;
use crate::config::{Highlight, Options, RequiredPlacement};
use crate::dom::Dom;

pub const MSG_CLASS: &str = "msg";
pub const STATUS_CLASS: &str = "fieldstatus";
pub const REQUIRED_CLASS: &str = "required";
pub const HIDDEN_CLASS: &str = "hidden";

/// Attribute tying a required marker to the field name it was created for.
pub const MARKER_FOR_ATTR: &str = "data-required-for";

const STATE_CLASSES: [&str; 3] = ["error", "info", "ok"];

const ERROR_TITLE: &str = "There are errors with this field. Click for more info.";
const OK_TITLE: &str = "This field has been completed successfully.";
const INFO_TITLE: &str = "Click for more information about this field.";

/// The compact-mode status icon: a link wrapping an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIcon<N> {
    pub link: Option<N>,
    pub img: Option<N>,
}

/// Find the message span next to `element`, creating it when missing.
pub fn message_span<D: Dom>(
    dom: &mut D,
    element: D::Node,
    options: &Options,
    context: &str,
) -> Option<D::Node> {
    let Some(parent) = dom.parent(element) else {
        warn!("[gvalidator] field {element:?} has no parent, messages disabled");
        return None;
    };
    if let Some(existing) = dom.find_with_class(parent, "span", MSG_CLASS) {
        return Some(existing);
    }

    let span = dom.create_element("span");
    dom.add_class(span, MSG_CLASS);
    dom.add_class(span, if options.is_compact() { HIDDEN_CLASS } else { "icon" });
    dom.add_class(span, "info");
    dom.set_inner_html(span, context);
    dom.append_child(parent, span);
    Some(span)
}

/// Find or build the status icon, placing a new one in front of the message
/// span.
pub fn status_icon<D: Dom>(
    dom: &mut D,
    element: D::Node,
    msg_span: Option<D::Node>,
    options: &Options,
) -> StatusIcon<D::Node> {
    let Some(parent) = dom.parent(element) else {
        return StatusIcon { link: None, img: None };
    };
    if let Some(existing) = dom.find_with_class(parent, "span", STATUS_CLASS) {
        return StatusIcon {
            link: dom.elements_by_tag(Some(existing), "a").first().copied(),
            img: dom.elements_by_tag(Some(existing), "img").first().copied(),
        };
    }

    let span = dom.create_element("span");
    dom.add_class(span, STATUS_CLASS);
    let img = dom.create_element("img");
    dom.set_attribute(img, "src", &options.icons.info);
    let link = dom.create_element("a");
    dom.append_child(link, img);
    dom.append_child(span, link);
    dom.insert_before(parent, span, msg_span);

    StatusIcon {
        link: Some(link),
        img: Some(img),
    }
}

/// Insert the required marker (or a blank placeholder for optional fields).
///
/// Every field gets its own marker, even when several share a parent. A
/// marker left by an earlier setup of the same named field is reused.
pub fn required_marker<D: Dom>(
    dom: &mut D,
    element: D::Node,
    name: &str,
    options: &Options,
    required: bool,
) {
    if !options.req_show {
        return;
    }
    let Some(parent) = dom.parent(element) else {
        return;
    };
    let text = if required { options.req_char.as_str() } else { "&nbsp;" };

    if !name.is_empty()
        && let Some(existing) = dom
            .elements_by_tag(Some(parent), "span")
            .into_iter()
            .find(|span| {
                dom.has_class(*span, REQUIRED_CLASS)
                    && dom.attribute(*span, MARKER_FOR_ATTR).as_deref() == Some(name)
            })
    {
        dom.set_inner_html(existing, text);
        return;
    }

    let span = dom.create_element("span");
    dom.add_class(span, REQUIRED_CLASS);
    if !name.is_empty() {
        dom.set_attribute(span, MARKER_FOR_ATTR, name);
    }
    dom.set_inner_html(span, text);

    let reference = match options.req_placement {
        RequiredPlacement::Before => dom.first_child(parent),
        RequiredPlacement::After => Some(element),
    };
    dom.insert_before(parent, span, reference);
}

/// Show `state` on the field: highlight, message span classes and text, and
/// the compact icon.
pub fn render<D: Dom>(
    dom: &mut D,
    element: D::Node,
    msg_span: Option<D::Node>,
    icon: Option<D::Node>,
    options: &Options,
    state: FieldState,
    message: &str,
) {
    if let Highlight::Class(class) = &options.highlight_fields {
        dom.remove_class(element, class);
        if state.is_failure() {
            dom.add_class(element, class);
        }
    }

    let (src, title, class) = match state {
        FieldState::Empty | FieldState::Error => (&options.icons.error, ERROR_TITLE, "error"),
        FieldState::Ok => (&options.icons.ok, OK_TITLE, "ok"),
        FieldState::Reset | FieldState::Info => (&options.icons.info, INFO_TITLE, "info"),
    };

    if let Some(span) = msg_span {
        for old in STATE_CLASSES {
            dom.remove_class(span, old);
        }
        if state == FieldState::Reset && options.is_compact() {
            dom.add_class(span, HIDDEN_CLASS);
        }
        dom.add_class(span, class);
        dom.set_inner_html(span, message);
    }

    if options.is_compact()
        && let Some(img) = icon
    {
        dom.set_attribute(img, "src", src);
        dom.set_attribute(img, "alt", title);
        dom.set_attribute(img, "title", title);
    }
}

/// Flip the message span's visibility. Returns true if it is now visible.
pub fn toggle_hidden<D: Dom>(dom: &mut D, span: D::Node) -> bool {
    if dom.has_class(span, HIDDEN_CLASS) {
        dom.remove_class(span, HIDDEN_CLASS);
        true
    } else {
        dom.add_class(span, HIDDEN_CLASS);
        false
    }
}
