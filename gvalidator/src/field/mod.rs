//! Per-field validation state machine.
//!
//! A [`FieldValidator`] is bound to one control (or, for checkbox and radio
//! groups, to every control sharing its name). Each call to
//! [`FieldValidator::validate`] recomputes its [`FieldState`] from the DOM
//! and re-renders the inline feedback.

mod pattern;
pub mod render;
mod variant;

use std::fmt;

use log::{debug, warn};

use crate::config::{ElementMessageFormat, FieldErrorCallback, Options};
use crate::dom::{Dom, EventType};
use crate::form::FieldReport;

pub use pattern::Pattern;
pub use render::StatusIcon;
pub use variant::{Behavior, FieldKind, Messages, Overrides, VariantTag};

/// Class marking a field as required.
pub const REQUIRED_MARKER: &str = "required";

/// Label used when no `<label>` or `<legend>` describes a field.
pub const FALLBACK_LABEL: &str = "Field";

/// Sibling id a confirm-password field compares against when it carries no
/// `data-match` attribute.
pub const DEFAULT_MATCH_ID: &str = "password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldState {
    /// Freshly reset; shows context information.
    #[default]
    Reset,
    /// No value yet, and not (yet) a failure.
    Info,
    Ok,
    /// Holds a value that fails the field's rule.
    Error,
    /// Required, touched and left blank.
    Empty,
}

impl FieldState {
    pub fn is_failure(self) -> bool {
        matches!(self, FieldState::Error | FieldState::Empty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldState::Reset => "reset",
            FieldState::Info => "info",
            FieldState::Ok => "ok",
            FieldState::Error => "error",
            FieldState::Empty => "empty",
        }
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a field listener does when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAction {
    Validate,
    /// Show the context message on an untouched, empty field.
    ShowContext,
    MarkModified,
    /// Show or hide the message behind the compact status icon.
    TogglePopup,
}

/// Form-level settings a field needs while it runs.
pub struct FieldContext<'a, D: Dom> {
    pub form: D::Node,
    pub options: &'a Options,
    pub on_error: Option<&'a FieldErrorCallback>,
}

impl<'a, D: Dom> FieldContext<'a, D> {
    pub fn new(form: D::Node, options: &'a Options) -> Self {
        Self {
            form,
            options,
            on_error: None,
        }
    }
}

/// Validation state and behavior of one form field.
pub struct FieldValidator<D: Dom> {
    element: D::Node,
    name: String,
    class_token: String,
    variant: VariantTag,
    behavior: Behavior,
    required: bool,
    modified: bool,
    state: FieldState,
    label: Option<String>,
    group: Vec<D::Node>,
    msg_span: Option<D::Node>,
    icon: StatusIcon<D::Node>,
}

impl<D: Dom> fmt::Debug for FieldValidator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("element", &self.element)
            .field("name", &self.name)
            .field("class_token", &self.class_token)
            .field("variant", &self.variant)
            .field("required", &self.required)
            .field("modified", &self.modified)
            .field("state", &self.state)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> FieldValidator<D> {
    pub fn new(
        element: D::Node,
        name: impl Into<String>,
        class_token: impl Into<String>,
        variant: VariantTag,
        behavior: Behavior,
    ) -> Self {
        Self {
            element,
            name: name.into(),
            class_token: class_token.into(),
            variant,
            behavior,
            required: false,
            modified: false,
            state: FieldState::Reset,
            label: None,
            group: Vec::new(),
            msg_span: None,
            icon: StatusIcon {
                link: None,
                img: None,
            },
        }
    }

    // Accessors

    pub fn element(&self) -> D::Node {
        self.element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_token(&self) -> &str {
        &self.class_token
    }

    pub fn variant(&self) -> VariantTag {
        self.variant
    }

    pub fn kind(&self) -> FieldKind {
        self.behavior.kind
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn messages(&self) -> &Messages {
        &self.behavior.messages
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// The resolved label, or the fallback before setup has run.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(FALLBACK_LABEL)
    }

    /// Every element this field listens on: the group members for checkbox
    /// and radio fields, otherwise just the bound element.
    pub fn members(&self) -> &[D::Node] {
        if self.group.is_empty() {
            std::slice::from_ref(&self.element)
        } else {
            &self.group
        }
    }

    pub fn message_span(&self) -> Option<D::Node> {
        self.msg_span
    }

    pub fn status_icon(&self) -> StatusIcon<D::Node> {
        self.icon
    }

    /// The empty message with `%field%` replaced by the quoted label.
    pub fn empty_message(&self) -> String {
        self.behavior
            .messages
            .empty
            .replace("%field%", &format!("'{}'", self.label()))
    }

    /// The message shown for the current state.
    pub fn current_message(&self) -> String {
        let messages = &self.behavior.messages;
        match self.state {
            FieldState::Ok => messages.success.clone(),
            FieldState::Error => messages.error.clone(),
            FieldState::Empty => self.empty_message(),
            FieldState::Reset | FieldState::Info => messages.context.clone(),
        }
    }

    pub fn report(&self) -> FieldReport {
        FieldReport {
            name: self.name.clone(),
            class_token: self.class_token.clone(),
            label: self.label().to_string(),
            state: self.state,
            message: self.current_message(),
            error_message: self.behavior.messages.error.clone(),
            empty_message: self.empty_message(),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        self.behavior.apply(overrides);
    }

    // Lifecycle

    /// Prepare the field: detect required-ness, acquire or create the
    /// feedback elements, run an initial validation and attach listeners.
    /// Returns the attached listeners and what each one does.
    pub fn setup(&mut self, dom: &mut D, cx: &FieldContext<'_, D>) -> Vec<(D::Listener, FieldAction)> {
        let options = cx.options;
        if dom.has_class(self.element, REQUIRED_MARKER) {
            self.required = true;
        }

        self.msg_span = render::message_span(dom, self.element, options, &self.behavior.messages.context);
        if options.is_compact() {
            self.icon = render::status_icon(dom, self.element, self.msg_span, options);
        }
        render::required_marker(dom, self.element, &self.name, options, self.required);

        if self.behavior.kind.is_group() {
            self.group = dom.inputs_named(cx.form, &self.name);
            if self.group.is_empty() {
                self.group.push(self.element);
            }
        }
        self.label = Some(self.resolve_label(dom, cx.form));

        self.validate(dom, cx);

        let mut listeners = Vec::new();
        let mut listen = |dom: &mut D, node: D::Node, event: EventType, action: FieldAction| {
            listeners.push((dom.add_listener(node, event), action));
        };
        match self.behavior.kind {
            FieldKind::CheckboxGroup | FieldKind::RadioGroup => {
                for member in self.group.clone() {
                    listen(dom, member, EventType::Click, FieldAction::Validate);
                    listen(dom, member, EventType::Click, FieldAction::ShowContext);
                    listen(dom, member, EventType::Change, FieldAction::MarkModified);
                }
            }
            FieldKind::Choice => {
                listen(dom, self.element, EventType::Click, FieldAction::Validate);
                listen(dom, self.element, EventType::Blur, FieldAction::Validate);
                listen(dom, self.element, EventType::Click, FieldAction::ShowContext);
                listen(dom, self.element, EventType::Change, FieldAction::MarkModified);
            }
            FieldKind::TextPattern | FieldKind::CaptchaLike | FieldKind::PasswordConfirm => {
                listen(dom, self.element, EventType::Blur, FieldAction::Validate);
                listen(dom, self.element, EventType::Click, FieldAction::ShowContext);
                listen(dom, self.element, EventType::Change, FieldAction::MarkModified);
            }
        }
        // A status icon shared with an earlier field of the same parent is
        // already wired to the shared message span.
        if let Some(link) = self.icon.link
            && dom.listeners(link, options.e_msg_event_on).is_empty()
        {
            listen(dom, link, options.e_msg_event_on, FieldAction::TogglePopup);
            if let Some(off) = options.e_msg_event_off {
                listen(dom, link, off, FieldAction::TogglePopup);
            }
        }

        debug!(
            "[gvalidator] set up field '{}' as {} (required: {}, {} listener(s))",
            self.name,
            self.variant,
            self.required,
            listeners.len()
        );
        listeners
    }

    /// Recompute the state from the current DOM value. Returns true if the
    /// field passes.
    pub fn validate(&mut self, dom: &mut D, cx: &FieldContext<'_, D>) -> bool {
        let (passed, state) = match self.behavior.kind {
            FieldKind::CheckboxGroup | FieldKind::RadioGroup => {
                if self.members().iter().any(|m| dom.is_checked(*m)) {
                    (true, FieldState::Ok)
                } else {
                    (false, self.blank_state())
                }
            }
            FieldKind::Choice => {
                if dom.value(self.element).is_empty() {
                    (false, self.blank_state())
                } else {
                    (true, FieldState::Ok)
                }
            }
            FieldKind::TextPattern | FieldKind::CaptchaLike | FieldKind::PasswordConfirm => {
                let raw = dom.value(self.element);
                if raw.is_empty() {
                    (false, self.blank_state())
                } else {
                    let value = self.sanitize(dom, raw);
                    let mut passed = self
                        .behavior
                        .match_pattern
                        .as_ref()
                        .is_none_or(|pattern| pattern.is_match(&value));
                    if passed && self.behavior.kind == FieldKind::PasswordConfirm {
                        passed = self.matches_sibling(dom, &value);
                    }
                    let state = if passed { FieldState::Ok } else { FieldState::Error };
                    (passed, state)
                }
            }
        };
        self.set_state(dom, cx, state);
        passed
    }

    /// Clear the modified flag and return to the reset state.
    pub fn reset(&mut self, dom: &mut D, cx: &FieldContext<'_, D>) {
        self.modified = false;
        self.set_state(dom, cx, FieldState::Reset);
    }

    /// Show the context message if the field is untouched and empty.
    pub fn show_context(&mut self, dom: &mut D, cx: &FieldContext<'_, D>) {
        if self.msg_span.is_none() || self.modified || self.behavior.messages.context.is_empty() {
            return;
        }
        if dom.value(self.element).is_empty() {
            self.set_state(dom, cx, FieldState::Info);
        }
    }

    /// Show or hide the message span. Returns true if it is now visible.
    pub fn toggle_message(&mut self, dom: &mut D) -> bool {
        match self.msg_span {
            Some(span) => render::toggle_hidden(dom, span),
            None => false,
        }
    }

    /// Run the effect of a fired listener.
    pub fn perform(&mut self, dom: &mut D, cx: &FieldContext<'_, D>, action: FieldAction) {
        match action {
            FieldAction::Validate => {
                self.validate(dom, cx);
            }
            FieldAction::ShowContext => self.show_context(dom, cx),
            FieldAction::MarkModified => self.modified = true,
            FieldAction::TogglePopup => {
                self.toggle_message(dom);
            }
        }
    }

    // Internals

    fn blank_state(&self) -> FieldState {
        if !self.modified || !self.required {
            FieldState::Info
        } else {
            FieldState::Empty
        }
    }

    /// Strip disallowed characters, writing the cleaned value back to the
    /// control when it changed.
    fn sanitize(&self, dom: &mut D, value: String) -> String {
        let Some(re) = &self.behavior.sanitize_pattern else {
            return value;
        };
        let cleaned = re.replace_all(&value, "").into_owned();
        if cleaned != value {
            dom.set_value(self.element, &cleaned);
        }
        cleaned
    }

    fn matches_sibling(&self, dom: &D, value: &str) -> bool {
        let target = dom
            .attribute(self.element, "data-match")
            .unwrap_or_else(|| DEFAULT_MATCH_ID.to_string());
        match dom.element_by_id(&target) {
            Some(sibling) => dom.value(sibling) == value,
            None => {
                warn!(
                    "[gvalidator] field '{}' confirms '#{target}', which does not exist",
                    self.name
                );
                false
            }
        }
    }

    fn set_state(&mut self, dom: &mut D, cx: &FieldContext<'_, D>, state: FieldState) {
        if self.state != state {
            debug!("[gvalidator] field '{}': {} -> {}", self.name, self.state, state);
        }
        self.state = state;

        let message = self.current_message();
        render::render(
            dom,
            self.element,
            self.msg_span,
            self.icon.img,
            cx.options,
            state,
            &message,
        );

        if cx.options.e_msg_format == ElementMessageFormat::Function
            && state.is_failure()
            && let Some(callback) = cx.on_error
        {
            callback(&self.report());
        }
    }

    /// `<label for=id>` inside the form, else the legend of the nearest
    /// enclosing fieldset, else [`FALLBACK_LABEL`].
    fn resolve_label(&self, dom: &D, form: D::Node) -> String {
        let control = dom.control_type(self.element).unwrap_or_default();
        if control != "checkbox"
            && control != "radio"
            && let Some(id) = dom.attribute(self.element, "id")
            && let Some(label) = dom
                .elements_by_tag(Some(form), "label")
                .into_iter()
                .find(|l| dom.attribute(*l, "for").as_deref() == Some(id.as_str()))
        {
            return dom.inner_html(label);
        }

        let mut current = dom.parent(self.element);
        while let Some(node) = current {
            let tag = dom.tag_name(node).to_ascii_lowercase();
            if tag == "fieldset"
                && let Some(legend) = dom.elements_by_tag(Some(node), "legend").first()
            {
                return dom.inner_html(*legend);
            }
            if tag == "form" {
                break;
            }
            current = dom.parent(node);
        }
        FALLBACK_LABEL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use formdom::{Document, Element};

    use super::*;

    fn page(input: Element) -> Document {
        Document::new(
            Element::form()
                .id("f")
                .child(Element::div().child(Element::label("in", "Your email")).child(input)),
        )
    }

    fn field(doc: &Document, variant: VariantTag) -> FieldValidator<Document> {
        let element = doc.element_by_id("in").unwrap();
        FieldValidator::new(element, "in", "test", variant, variant.behavior())
    }

    #[test]
    fn test_state_names() {
        assert_eq!(FieldState::Empty.to_string(), "empty");
        assert!(FieldState::Error.is_failure());
        assert!(!FieldState::Info.is_failure());
    }

    #[test]
    fn test_label_from_label_element() {
        let mut doc = page(Element::input("text").id("in").name("in"));
        let form = doc.root();
        let options = Options::default();
        let cx = FieldContext::<Document>::new(form, &options);

        let mut field = field(&doc, VariantTag::EmailField);
        field.setup(&mut doc, &cx);
        assert_eq!(field.label(), "Your email");
        assert_eq!(field.empty_message(), "'Your email' is required, please complete");
    }

    #[test]
    fn test_sanitize_writes_back() {
        let mut doc = page(Element::input("text").id("in").name("in").value("Jo3hn"));
        let form = doc.root();
        let options = Options::default();
        let cx = FieldContext::<Document>::new(form, &options);

        let mut field = field(&doc, VariantTag::NameField);
        assert!(field.validate(&mut doc, &cx));
        assert_eq!(doc.value(field.element()), "John");
        assert_eq!(field.state(), FieldState::Ok);
    }

    #[test]
    fn test_blank_state_gating() {
        let mut doc = page(Element::input("text").id("in").name("in"));
        let form = doc.root();
        let options = Options::default();
        let cx = FieldContext::<Document>::new(form, &options);
        let mut field = field(&doc, VariantTag::EmailField);

        field.set_required(true);
        assert!(!field.validate(&mut doc, &cx));
        assert_eq!(field.state(), FieldState::Info);

        field.set_modified(true);
        assert!(!field.validate(&mut doc, &cx));
        assert_eq!(field.state(), FieldState::Empty);

        field.set_required(false);
        assert!(!field.validate(&mut doc, &cx));
        assert_eq!(field.state(), FieldState::Info);
    }
}
