//! Commonly used types, for glob import.

pub use crate::config::{
    ElementMessageFormat, FieldOverrides, FormMessageFormat, Highlight, Options, PageConfig,
    PluginDecl, RequiredPlacement,
};
pub use crate::dom::{Dom, EventType};
pub use crate::error::{ConfigError, RegistryError};
pub use crate::field::{FieldAction, FieldKind, FieldState, FieldValidator, VariantTag};
pub use crate::form::{Dispatch, FieldReport, FormController, ReportStrategy};
pub use crate::registry::{ValidatorDescriptor, ValidatorRegistry};
pub use crate::session::ValidationSession;

pub use formdom::{Document, Element, NodeId};
