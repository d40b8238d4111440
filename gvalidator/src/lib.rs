//! Class-name driven form validation.
//!
//! Forms opt in with the `gform` (or `autoform`) class. Every control inside
//! such a form is matched against a [`ValidatorRegistry`] by its class names;
//! the first class that names a registered validator wins. Each matched
//! control gets a [`FieldValidator`] that renders inline ok/info/error
//! feedback as the user interacts with it, and the owning [`FormController`]
//! blocks submission until every required field passes.
//!
//! The library never touches a browser directly. All DOM access goes through
//! the [`Dom`] trait, which is implemented for the headless
//! [`formdom::Document`].
//!
//! # Example
//!
//! ```ignore
//! use gvalidator::prelude::*;
//!
//! let mut doc = Document::new(page());
//! let mut session = ValidationSession::new(ValidatorRegistry::with_builtins(), PageConfig::default());
//! session.start(&mut doc);
//! session.apply_focus(&mut doc);
//!
//! // Later, when the host fires a submit event:
//! for outcome in session.trigger(&mut doc, form, EventType::Submit) {
//!     if let Dispatch::Submit { allowed: false } = outcome {
//!         // cancel the submission
//!     }
//! }
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod field;
pub mod form;
pub mod prelude;
pub mod registry;
pub mod session;

pub use config::{Options, PageConfig};
pub use dom::Dom;
pub use error::{ConfigError, RegistryError};
pub use field::{FieldKind, FieldState, FieldValidator, VariantTag};
pub use form::{Dispatch, FieldReport, FormController, ReportStrategy};
pub use registry::{ValidatorDescriptor, ValidatorRegistry};
pub use session::ValidationSession;
