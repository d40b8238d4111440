//! Validator registry - maps class tokens to field variants.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};

use crate::config::{FieldOverrides, PluginDecl};
use crate::dom::Dom;
use crate::error::RegistryError;
use crate::field::{FieldValidator, Overrides, VariantTag};

/// The class-token vocabulary available without any plugins.
pub const BUILTIN_TOKENS: &[(&str, VariantTag)] = &[
    ("select", VariantTag::ComboBox),
    ("combo", VariantTag::ComboBox),
    ("checkbox", VariantTag::Checkbox),
    ("radio", VariantTag::RadioButton),
    ("firstname", VariantTag::NameField),
    ("lastname", VariantTag::NameField),
    ("name", VariantTag::NameField),
    ("phone", VariantTag::PhoneField),
    ("password", VariantTag::PasswordField),
    ("confirmpassword", VariantTag::ConfirmPasswordField),
    ("email", VariantTag::EmailField),
    ("text", VariantTag::GenericTextField),
    ("generictext", VariantTag::GenericTextField),
    ("captcha", VariantTag::CaptchaTextField),
    ("recaptcha_response_field", VariantTag::RecaptchaTextField),
    ("recaptcha", VariantTag::RecaptchaTextField),
];

/// A registered class token.
#[derive(Debug, Clone)]
pub struct ValidatorDescriptor {
    pub class_token: String,
    pub variant: VariantTag,
    /// Applied on top of the variant's built-in behavior at instantiation.
    pub defaults: Overrides,
}

/// Registry of class tokens.
///
/// Written during session construction (built-ins, then plugins) and only
/// read once forms are built.
#[derive(Default)]
pub struct ValidatorRegistry {
    descriptors: BTreeMap<String, ValidatorDescriptor>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("tokens", &self.tokens())
            .finish()
    }
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in vocabulary.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (token, variant) in BUILTIN_TOKENS {
            if let Err(err) = registry.register(*token, *variant, &FieldOverrides::default()) {
                warn!("[gvalidator] {err}");
            }
        }
        debug!("[gvalidator] registered {} built-in token(s)", registry.len());
        registry
    }

    /// Register a class token.
    ///
    /// Fails without touching the existing entry if the token is taken, or if
    /// a default pattern does not compile.
    pub fn register(
        &mut self,
        token: impl Into<String>,
        variant: VariantTag,
        defaults: &FieldOverrides,
    ) -> Result<(), RegistryError> {
        let token = token.into();

        // First registration wins
        if self.descriptors.contains_key(&token) {
            return Err(RegistryError::DuplicateToken { token });
        }

        let defaults = Overrides::compile(defaults).map_err(|source| RegistryError::InvalidPattern {
            token: token.clone(),
            source,
        })?;

        debug!("[gvalidator] registering '{token}' as {variant}");
        self.descriptors.insert(
            token.clone(),
            ValidatorDescriptor {
                class_token: token,
                variant,
                defaults,
            },
        );
        Ok(())
    }

    /// Register every plugin declaration, in order. Failures are logged and
    /// returned; the remaining declarations are still registered.
    pub fn load_plugins(&mut self, plugins: &[(String, PluginDecl)]) -> Vec<RegistryError> {
        let mut failures = Vec::new();
        for (token, decl) in plugins {
            let result = decl
                .extends
                .parse::<VariantTag>()
                .and_then(|variant| self.register(token.as_str(), variant, &decl.overrides));
            if let Err(err) = result {
                warn!("[gvalidator] plugin '{token}': {err}");
                failures.push(err);
            }
        }
        info!(
            "[gvalidator] loaded {} of {} plugin(s)",
            plugins.len() - failures.len(),
            plugins.len()
        );
        failures
    }

    pub fn get(&self, token: &str) -> Option<&ValidatorDescriptor> {
        self.descriptors.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.descriptors.contains_key(token)
    }

    /// Registered tokens in sorted order.
    pub fn tokens(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Build a validator for `element` from the descriptor registered under
    /// `token`. Returns `None` for unknown tokens.
    pub fn instantiate<D: Dom>(
        &self,
        token: &str,
        element: D::Node,
        name: &str,
    ) -> Option<FieldValidator<D>> {
        let descriptor = self.get(token)?;
        let mut behavior = descriptor.variant.behavior();
        behavior.apply(&descriptor.defaults);
        Some(FieldValidator::new(
            element,
            name,
            token,
            descriptor.variant,
            behavior,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = ValidatorRegistry::with_builtins();
        assert_eq!(registry.len(), BUILTIN_TOKENS.len());
        assert_eq!(registry.get("email").unwrap().variant, VariantTag::EmailField);
        assert_eq!(registry.get("recaptcha").unwrap().variant, VariantTag::RecaptchaTextField);
        assert!(!registry.contains("required"));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut registry = ValidatorRegistry::with_builtins();
        let err = registry
            .register("email", VariantTag::PhoneField, &FieldOverrides::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateToken { token } if token == "email"));
        assert_eq!(registry.get("email").unwrap().variant, VariantTag::EmailField);
    }

    #[test]
    fn test_bad_default_pattern() {
        let mut registry = ValidatorRegistry::new();
        let err = registry
            .register(
                "broken",
                VariantTag::GenericTextField,
                &FieldOverrides::default().match_pattern("("),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_plugins_reports_failures() {
        let mut registry = ValidatorRegistry::with_builtins();
        let plugins = vec![
            (
                "postcode".to_string(),
                PluginDecl {
                    extends: "PostcodeField".to_string(),
                    overrides: FieldOverrides::default(),
                },
            ),
            (
                "ip4address".to_string(),
                PluginDecl {
                    extends: "GenericTextField".to_string(),
                    overrides: FieldOverrides::default().match_pattern(r"^[0-9.]+$"),
                },
            ),
            (
                "phone".to_string(),
                PluginDecl {
                    extends: "GenericTextField".to_string(),
                    overrides: FieldOverrides::default(),
                },
            ),
        ];

        let failures = registry.load_plugins(&plugins);
        assert_eq!(failures.len(), 2);
        assert!(matches!(&failures[0], RegistryError::UnknownVariant(name) if name == "PostcodeField"));
        assert!(matches!(&failures[1], RegistryError::DuplicateToken { token } if token == "phone"));
        assert!(registry.contains("ip4address"));
        assert!(!registry.contains("postcode"));
        assert_eq!(registry.get("phone").unwrap().variant, VariantTag::PhoneField);
    }
}
