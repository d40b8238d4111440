//! Form-level error reporting.

use std::fmt;

use log::warn;

use crate::config::{FormErrorCallback, FormMessageFormat, Options, PageConfig};
use crate::field::FieldState;

/// Snapshot of one field, handed to callbacks and error containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub name: String,
    pub class_token: String,
    pub label: String,
    pub state: FieldState,
    /// The message for the current state.
    pub message: String,
    pub error_message: String,
    /// The empty message with the label substituted.
    pub empty_message: String,
}

impl FieldReport {
    /// The line shown for this field in an error list.
    pub fn summary(&self) -> &str {
        match self.state {
            FieldState::Error => &self.error_message,
            _ => &self.empty_message,
        }
    }
}

/// How a form presents a failed submission, resolved once when the form is
/// built.
#[derive(Clone)]
pub enum ReportStrategy {
    Alert,
    /// Render an error list into the element with this id.
    Container(String),
    /// Hand the failing fields to a callback whose answer decides submission.
    Callback(FormErrorCallback),
}

impl fmt::Debug for ReportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alert => write!(f, "Alert"),
            Self::Container(id) => f.debug_tuple("Container").field(id).finish(),
            Self::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl ReportStrategy {
    /// Pick the strategy for a form. A `container` or `function` format
    /// without its container id or callback falls back to `Alert`.
    pub fn resolve(options: &Options, config: &PageConfig, form_id: Option<&str>) -> Self {
        match options.f_msg_format {
            FormMessageFormat::Alert => Self::Alert,
            FormMessageFormat::Container => match &options.f_msg_container {
                Some(id) if !id.is_empty() => Self::Container(id.clone()),
                _ => {
                    warn!("[gvalidator] container format without fMsgContainer, using alert");
                    Self::Alert
                }
            },
            FormMessageFormat::Function => match config.form_callback(form_id) {
                Some(callback) => Self::Callback(callback),
                None => {
                    warn!("[gvalidator] function format without a registered callback, using alert");
                    Self::Alert
                }
            },
        }
    }
}

/// Outcome of routing one fired listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The form was validated; `allowed` says whether submission proceeds.
    Submit { allowed: bool },
    Reset,
    /// A field listener ran; `state` is the field's state afterwards.
    Field { name: String, state: FieldState },
    /// A compact status icon was toggled.
    Popup { name: String, visible: bool },
}
