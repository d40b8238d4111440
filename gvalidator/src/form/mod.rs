//! One validated form.
//!
//! A [`FormController`] discovers the form's fields, owns their validators
//! and the listeners it attached, and decides whether a submission may
//! proceed.

mod report;

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};

use crate::config::{FieldErrorCallback, Options, PageConfig};
use crate::dom::{Dom, EventType};
use crate::error::ConfigError;
use crate::field::{FieldAction, FieldContext, FieldState, FieldValidator, Overrides};
use crate::registry::ValidatorRegistry;

pub use report::{Dispatch, FieldReport, ReportStrategy};

/// Control types that get a validator.
pub const SUPPORTED_TYPES: &[&str] = &[
    "text",
    "password",
    "textarea",
    "select-one",
    "select-multiple",
    "checkbox",
    "radio",
    "file",
];

/// Form class that enables the per-form options section.
pub const CUSTOM_MARKER: &str = "custom";

/// Id of the list rendered into an error container.
pub const ERRORS_LIST_ID: &str = "gvErrorsList";

/// Value given to submit inputs once the form is on its way.
pub const SUBMITTING_LABEL: &str = "Please wait...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Field { index: usize, action: FieldAction },
    Submit,
    Reset,
}

pub struct FormController<D: Dom> {
    form: D::Node,
    id: Option<String>,
    language: Option<String>,
    options: Options,
    strategy: ReportStrategy,
    on_field_error: Option<FieldErrorCallback>,
    fields: Vec<FieldValidator<D>>,
    bindings: HashMap<D::Listener, Binding>,
    last_errors: Vec<FieldReport>,
}

impl<D: Dom> fmt::Debug for FormController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form", &self.form)
            .field("id", &self.id)
            .field("language", &self.language)
            .field("strategy", &self.strategy)
            .field("fields", &self.fields)
            .field("listeners", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl<D: Dom> FormController<D> {
    /// Resolve the form's options, set up a validator for every supported
    /// control and hook the form's submit and reset events.
    pub fn build(dom: &mut D, form: D::Node, registry: &ValidatorRegistry, config: &PageConfig) -> Self {
        let id = dom.attribute(form, "id").filter(|id| !id.is_empty());
        let language = dom
            .attribute(form, "lang")
            .filter(|lang| !lang.is_empty())
            .or_else(|| dom.attribute(form, "data-lang"))
            .filter(|lang| !lang.is_empty())
            .map(|lang| lang.to_uppercase());
        let custom = dom.has_class(form, CUSTOM_MARKER);

        let options = config
            .options_for(id.as_deref(), custom)
            .unwrap_or_else(|err| {
                warn!("[gvalidator] form {form:?}: {err}; using default options");
                Options::default()
            });
        let strategy = ReportStrategy::resolve(&options, config, id.as_deref());
        let on_field_error = config.field_callback(id.as_deref());

        let mut controller = Self {
            form,
            id,
            language,
            options,
            strategy,
            on_field_error,
            fields: Vec::new(),
            bindings: HashMap::new(),
            last_errors: Vec::new(),
        };

        for tag in ["input", "textarea", "select"] {
            for node in dom.elements_by_tag(Some(form), tag) {
                controller.add_field(dom, node, registry, config);
            }
        }

        let submit = dom.add_listener(form, EventType::Submit);
        controller.bindings.insert(submit, Binding::Submit);
        let reset = dom.add_listener(form, EventType::Reset);
        controller.bindings.insert(reset, Binding::Reset);

        info!(
            "[gvalidator] form {} ready with {} field(s)",
            controller.id.as_deref().unwrap_or("<anonymous>"),
            controller.fields.len()
        );
        controller
    }

    fn add_field(&mut self, dom: &mut D, node: D::Node, registry: &ValidatorRegistry, config: &PageConfig) {
        let Some(control) = dom.control_type(node) else {
            return;
        };
        if !SUPPORTED_TYPES.contains(&control.as_str()) {
            return;
        }
        let name = dom.attribute(node, "name").unwrap_or_default();
        if !name.is_empty() && self.field_by_name(&name).is_some() {
            debug!("[gvalidator] '{name}' already has a validator");
            return;
        }

        let Some(mut field) = dom
            .classes(node)
            .iter()
            .find_map(|token| registry.instantiate::<D>(token, node, &name))
        else {
            return;
        };

        if let Some(lang) = &self.language {
            for entry in config.translation_for(lang, field.class_token()) {
                match Overrides::compile(entry) {
                    Ok(overrides) => field.apply_overrides(&overrides),
                    Err(source) => {
                        let err = ConfigError::InvalidTranslation {
                            lang: lang.clone(),
                            token: field.class_token().to_string(),
                            source,
                        };
                        warn!("[gvalidator] {err}");
                    }
                }
            }
        }

        let index = self.fields.len();
        let cx = FieldContext {
            form: self.form,
            options: &self.options,
            on_error: self.on_field_error.as_ref(),
        };
        for (listener, action) in field.setup(dom, &cx) {
            self.bindings.insert(listener, Binding::Field { index, action });
        }
        self.fields.push(field);
    }

    // Accessors

    pub fn node(&self) -> D::Node {
        self.form
    }

    pub fn form_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn strategy(&self) -> &ReportStrategy {
        &self.strategy
    }

    /// Fields in discovery order.
    pub fn fields(&self) -> &[FieldValidator<D>] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldValidator<D>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut FieldValidator<D>> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    /// Failing fields from the last [`validate_all`](Self::validate_all), in
    /// discovery order.
    pub fn errors(&self) -> &[FieldReport] {
        &self.last_errors
    }

    pub fn listener_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn owns(&self, listener: D::Listener) -> bool {
        self.bindings.contains_key(&listener)
    }

    // Operations

    /// Validate one field by name. Returns `None` if the form has no such
    /// field.
    pub fn validate_field(&mut self, dom: &mut D, name: &str) -> Option<bool> {
        let cx = FieldContext {
            form: self.form,
            options: &self.options,
            on_error: self.on_field_error.as_ref(),
        };
        let field = self.fields.iter_mut().find(|f| f.name() == name)?;
        Some(field.validate(dom, &cx))
    }

    /// Validate every field as if the user had touched it. Returns whether
    /// the form may be submitted.
    pub fn validate_all(&mut self, dom: &mut D) -> bool {
        let cx = FieldContext {
            form: self.form,
            options: &self.options,
            on_error: self.on_field_error.as_ref(),
        };

        let mut first = None;
        let mut errors = Vec::new();
        for field in &mut self.fields {
            field.set_modified(true);
            let passed = field.validate(dom, &cx);
            // Optional fields only count when they hold a bad value.
            if !passed && (field.is_required() || field.state() == FieldState::Error) {
                first.get_or_insert(field.element());
                errors.push(field.report());
            }
        }

        let Some(first) = first else {
            self.last_errors.clear();
            self.disable_submit_buttons(dom);
            info!("[gvalidator] form {} passed", self.label());
            return true;
        };

        dom.focus(first);
        let allowed = self.report_errors(dom, &errors);
        info!(
            "[gvalidator] form {} failed with {} error(s), submission {}",
            self.label(),
            errors.len(),
            if allowed { "allowed by callback" } else { "blocked" }
        );
        self.last_errors = errors;
        allowed
    }

    /// Return every field to its reset state.
    pub fn reset(&mut self, dom: &mut D) {
        let cx = FieldContext {
            form: self.form,
            options: &self.options,
            on_error: self.on_field_error.as_ref(),
        };
        for field in &mut self.fields {
            field.reset(dom, &cx);
        }
        self.last_errors.clear();
        debug!("[gvalidator] form {} reset", self.label());
    }

    /// Run the listener's effect. Returns `None` if the listener is not one
    /// of this form's.
    pub fn dispatch(&mut self, dom: &mut D, listener: D::Listener) -> Option<Dispatch> {
        let binding = *self.bindings.get(&listener)?;
        match binding {
            Binding::Submit => Some(Dispatch::Submit {
                allowed: self.validate_all(dom),
            }),
            Binding::Reset => {
                self.reset(dom);
                Some(Dispatch::Reset)
            }
            Binding::Field {
                index,
                action: FieldAction::TogglePopup,
            } => {
                let field = self.fields.get_mut(index)?;
                let visible = field.toggle_message(dom);
                Some(Dispatch::Popup {
                    name: field.name().to_string(),
                    visible,
                })
            }
            Binding::Field { index, action } => {
                let cx = FieldContext {
                    form: self.form,
                    options: &self.options,
                    on_error: self.on_field_error.as_ref(),
                };
                let field = self.fields.get_mut(index)?;
                field.perform(dom, &cx, action);
                Some(Dispatch::Field {
                    name: field.name().to_string(),
                    state: field.state(),
                })
            }
        }
    }

    /// Remove every listener this form and its fields attached.
    pub fn detach(&mut self, dom: &mut D) {
        for listener in self.bindings.keys() {
            dom.remove_listener(*listener);
        }
        debug!(
            "[gvalidator] form {} detached {} listener(s)",
            self.label(),
            self.bindings.len()
        );
        self.bindings.clear();
    }

    // Internals

    fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<anonymous>")
    }

    /// Present the failure. Returns true only when a callback lets the form
    /// submit anyway.
    fn report_errors(&self, dom: &mut D, errors: &[FieldReport]) -> bool {
        if !self.options.suppress_alert {
            dom.alert(&self.options.f_msg);
        }
        match &self.strategy {
            ReportStrategy::Alert => false,
            ReportStrategy::Container(id) => {
                render_error_list(dom, id, errors);
                false
            }
            ReportStrategy::Callback(callback) => callback(errors),
        }
    }

    fn disable_submit_buttons(&self, dom: &mut D) {
        for input in dom.elements_by_tag(Some(self.form), "input") {
            if dom.control_type(input).as_deref() == Some("submit") {
                dom.set_disabled(input, true);
                dom.set_value(input, SUBMITTING_LABEL);
            }
        }
        for button in dom.elements_by_tag(Some(self.form), "button") {
            if dom.control_type(button).as_deref() == Some("submit") {
                dom.set_disabled(button, true);
            }
        }
    }
}

/// Render the failing fields as a list inside the container, replacing any
/// earlier list, then reveal and scroll to the container.
fn render_error_list<D: Dom>(dom: &mut D, container_id: &str, errors: &[FieldReport]) {
    let Some(container) = dom.element_by_id(container_id) else {
        warn!("[gvalidator] error container '#{container_id}' not found");
        return;
    };

    let list = dom.create_element("ul");
    dom.set_attribute(list, "id", ERRORS_LIST_ID);
    for error in errors {
        let item = dom.create_element("li");
        dom.set_inner_html(item, error.summary());
        dom.append_child(list, item);
    }

    match dom.element_by_id(ERRORS_LIST_ID) {
        Some(old) if dom.parent(old) == Some(container) => dom.replace_child(container, list, old),
        _ => dom.append_child(container, list),
    }
    dom.remove_class(container, "hidden");
    dom.scroll_to(container);
}
