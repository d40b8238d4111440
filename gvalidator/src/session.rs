//! Page-level entry point.

use std::time::Duration;

use log::{debug, info};

use crate::config::PageConfig;
use crate::dom::{Dom, EventType};
use crate::error::RegistryError;
use crate::form::{Dispatch, FormController};
use crate::registry::ValidatorRegistry;

/// Form classes that opt a form into validation.
pub const FORM_MARKERS: &[&str] = &["autoform", "gform"];

/// Validation for every opted-in form on a page.
///
/// Construction loads the page's plugins into the registry; after that the
/// registry is only read. [`start`](Self::start) builds one
/// [`FormController`] per marked form, and the host routes fired listeners
/// back through [`dispatch`](Self::dispatch) or [`trigger`](Self::trigger).
#[derive(Debug)]
pub struct ValidationSession<D: Dom> {
    registry: ValidatorRegistry,
    config: PageConfig,
    forms: Vec<FormController<D>>,
    plugin_errors: Vec<RegistryError>,
    plugin_errors_reported: bool,
    focus_pending: bool,
}

impl<D: Dom> ValidationSession<D> {
    /// How long the host should wait after [`start`](Self::start) before
    /// calling [`apply_focus`](Self::apply_focus). Some renderers are not
    /// ready to take focus immediately after load.
    pub const FOCUS_DELAY: Duration = Duration::from_millis(500);

    pub fn new(mut registry: ValidatorRegistry, config: PageConfig) -> Self {
        let plugin_errors = registry.load_plugins(config.plugins());
        Self {
            registry,
            config,
            forms: Vec::new(),
            plugin_errors,
            plugin_errors_reported: false,
            focus_pending: false,
        }
    }

    /// Scan the page and build a controller for every marked form. Calling
    /// this again detaches the old controllers and rebuilds them. Returns
    /// the number of forms under validation.
    pub fn start(&mut self, dom: &mut D) -> usize {
        // Registration problems surface once, through the host
        if !self.plugin_errors_reported {
            for err in &self.plugin_errors {
                dom.alert(&err.to_string());
            }
            self.plugin_errors_reported = true;
        }

        for mut form in self.forms.drain(..) {
            form.detach(dom);
        }

        for form in dom.elements_by_tag(None, "form") {
            if FORM_MARKERS.iter().any(|marker| dom.has_class(form, marker)) {
                let controller = FormController::build(dom, form, &self.registry, &self.config);
                self.forms.push(controller);
            } else {
                debug!("[gvalidator] skipping unmarked form {form:?}");
            }
        }

        self.focus_pending = !self.forms.is_empty();
        info!("[gvalidator] session started with {} form(s)", self.forms.len());
        self.forms.len()
    }

    /// Whether [`apply_focus`](Self::apply_focus) still has work to do.
    pub fn focus_pending(&self) -> bool {
        self.focus_pending
    }

    /// Focus the first visible, enabled input of the first form, if that
    /// form has `autoFocus` on. Runs once per [`start`](Self::start).
    pub fn apply_focus(&mut self, dom: &mut D) -> Option<D::Node> {
        if !std::mem::take(&mut self.focus_pending) {
            return None;
        }
        let form = self.forms.first()?;
        if !form.options().auto_focus {
            return None;
        }
        let target = dom
            .elements_by_tag(Some(form.node()), "input")
            .into_iter()
            .find(|input| dom.control_type(*input).as_deref() != Some("hidden") && !dom.is_disabled(*input))?;
        dom.focus(target);
        Some(target)
    }

    /// Route a fired listener to the form that owns it.
    pub fn dispatch(&mut self, dom: &mut D, listener: D::Listener) -> Option<Dispatch> {
        self.forms
            .iter_mut()
            .find(|form| form.owns(listener))?
            .dispatch(dom, listener)
    }

    /// Fire `event` at `node`: run every listener registered for it, in
    /// attach order.
    pub fn trigger(&mut self, dom: &mut D, node: D::Node, event: EventType) -> Vec<Dispatch> {
        let listeners = dom.listeners(node, event);
        listeners
            .into_iter()
            .filter_map(|listener| self.dispatch(dom, listener))
            .collect()
    }

    /// Detach every controller's listeners and drop the controllers.
    pub fn detach(&mut self, dom: &mut D) {
        for mut form in self.forms.drain(..) {
            form.detach(dom);
        }
        self.focus_pending = false;
    }

    // Accessors

    pub fn forms(&self) -> &[FormController<D>] {
        &self.forms
    }

    /// The controller for the form with this DOM id.
    pub fn form(&self, id: &str) -> Option<&FormController<D>> {
        self.forms.iter().find(|form| form.form_id() == Some(id))
    }

    pub fn form_mut(&mut self, id: &str) -> Option<&mut FormController<D>> {
        self.forms.iter_mut().find(|form| form.form_id() == Some(id))
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Plugin declarations that could not be registered.
    pub fn plugin_errors(&self) -> &[RegistryError] {
        &self.plugin_errors
    }
}
