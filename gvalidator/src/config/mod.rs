//! Page configuration.
//!
//! The page supplies one JSON document with three optional sections:
//!
//! ```json
//! {
//!   "options":     { "reqChar": "*", "signup": { "reqChar": "^" } },
//!   "plugins":     { "ip4address": { "_extends": "GenericTextField", "regex": "^[0-9.]+$" } },
//!   "translation": { "DE": { "defaults": { "successMessage": "Fertig" } } }
//! }
//! ```
//!
//! Callbacks cannot live in JSON and are registered on the [`PageConfig`]
//! directly with [`PageConfig::on_form_errors`] and
//! [`PageConfig::on_field_error`].

mod merge;
mod options;
mod overrides;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ConfigError;
use crate::form::FieldReport;

pub use merge::{ALLOWED_KEYS, merge_allowed};
pub use options::{
    ElementMessageFormat, FormMessageFormat, Highlight, Icons, Options, RequiredPlacement,
};
pub use overrides::{FieldOverrides, PluginDecl};

/// Form-level reporter for the `function` form message format. Receives the
/// failing fields in discovery order; returning `true` lets the form submit.
pub type FormErrorCallback = Rc<dyn Fn(&[FieldReport]) -> bool>;

/// Field-level callback for the `function` element message format.
pub type FieldErrorCallback = Rc<dyn Fn(&FieldReport)>;

/// Translation entry holding the overrides shared by every class token.
pub const TRANSLATION_DEFAULTS: &str = "defaults";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPageConfig {
    options: Value,
    #[serde(deserialize_with = "plugins_in_order")]
    plugins: Vec<(String, PluginDecl)>,
    #[serde(alias = "translations")]
    translation: HashMap<String, HashMap<String, FieldOverrides>>,
}

/// Everything a page configures: global and per-form options, plugin
/// declarations, translations and callbacks.
#[derive(Clone, Default)]
pub struct PageConfig {
    options: Value,
    /// In declaration order, which is also registration order.
    plugins: Vec<(String, PluginDecl)>,
    translations: HashMap<String, HashMap<String, FieldOverrides>>,
    form_callbacks: HashMap<Option<String>, FormErrorCallback>,
    field_callbacks: HashMap<Option<String>, FieldErrorCallback>,
}

impl fmt::Debug for PageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageConfig")
            .field("options", &self.options)
            .field("plugins", &self.plugins.iter().map(|(token, _)| token).collect::<Vec<_>>())
            .field("translations", &self.translations.keys().collect::<Vec<_>>())
            .field("form_callbacks", &self.form_callbacks.len())
            .field("field_callbacks", &self.field_callbacks.len())
            .finish()
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawPageConfig = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawPageConfig = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawPageConfig) -> Self {
        let translations = raw
            .translation
            .into_iter()
            .map(|(lang, entries)| (lang.to_uppercase(), entries))
            .collect();
        Self {
            options: raw.options,
            plugins: raw.plugins,
            translations,
            ..Self::default()
        }
    }

    // Builders

    /// Replace the global options section.
    pub fn options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Declare a plugin. Re-declaring a token replaces the earlier
    /// declaration in place.
    pub fn plugin(mut self, token: impl Into<String>, decl: PluginDecl) -> Self {
        upsert_plugin(&mut self.plugins, token.into(), decl);
        self
    }

    /// Add a translation entry. `token` is a class token or
    /// [`TRANSLATION_DEFAULTS`].
    pub fn translation(
        mut self,
        lang: &str,
        token: impl Into<String>,
        overrides: FieldOverrides,
    ) -> Self {
        self.translations
            .entry(lang.to_uppercase())
            .or_default()
            .insert(token.into(), overrides);
        self
    }

    /// Register the `function` form reporter, for one form id or for every
    /// form when `form_id` is `None`.
    pub fn on_form_errors(
        mut self,
        form_id: Option<&str>,
        callback: impl Fn(&[FieldReport]) -> bool + 'static,
    ) -> Self {
        self.form_callbacks
            .insert(form_id.map(str::to_string), Rc::new(callback));
        self
    }

    /// Register the `function` element-message callback, for one form id or
    /// for every form when `form_id` is `None`.
    pub fn on_field_error(
        mut self,
        form_id: Option<&str>,
        callback: impl Fn(&FieldReport) + 'static,
    ) -> Self {
        self.field_callbacks
            .insert(form_id.map(str::to_string), Rc::new(callback));
        self
    }

    // Lookups

    /// Resolve the options for one form. The section keyed by the form id is
    /// only consulted for forms marked `custom`.
    pub fn options_for(&self, form_id: Option<&str>, custom: bool) -> Result<Options, ConfigError> {
        let form_section = match form_id {
            Some(id) if custom => self.options.get(id),
            _ => None,
        };
        Options::resolve(Some(&self.options), form_section)
    }

    pub fn plugins(&self) -> &[(String, PluginDecl)] {
        &self.plugins
    }

    /// Translation overrides for `token` in `lang`: the language defaults
    /// first, then the token's own entry.
    pub fn translation_for(&self, lang: &str, token: &str) -> Vec<&FieldOverrides> {
        let Some(entries) = self.translations.get(&lang.to_uppercase()) else {
            return Vec::new();
        };
        [TRANSLATION_DEFAULTS, token]
            .iter()
            .filter_map(|key| entries.get(*key))
            .collect()
    }

    pub fn form_callback(&self, form_id: Option<&str>) -> Option<FormErrorCallback> {
        lookup(&self.form_callbacks, form_id)
    }

    pub fn field_callback(&self, form_id: Option<&str>) -> Option<FieldErrorCallback> {
        lookup(&self.field_callbacks, form_id)
    }
}

fn upsert_plugin(plugins: &mut Vec<(String, PluginDecl)>, token: String, decl: PluginDecl) {
    match plugins.iter_mut().find(|(existing, _)| *existing == token) {
        Some(slot) => slot.1 = decl,
        None => plugins.push((token, decl)),
    }
}

/// Read the plugin map keeping the page's declaration order.
fn plugins_in_order<'de, D>(deserializer: D) -> Result<Vec<(String, PluginDecl)>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(PluginsVisitor)
}

struct PluginsVisitor;

impl<'de> Visitor<'de> for PluginsVisitor {
    type Value = Vec<(String, PluginDecl)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of class tokens to plugin declarations")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut plugins = Vec::new();
        while let Some((token, decl)) = map.next_entry::<String, PluginDecl>()? {
            upsert_plugin(&mut plugins, token, decl);
        }
        Ok(plugins)
    }
}

fn lookup<T: Clone>(map: &HashMap<Option<String>, T>, form_id: Option<&str>) -> Option<T> {
    form_id
        .and_then(|id| map.get(&Some(id.to_string())))
        .or_else(|| map.get(&None))
        .cloned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> PageConfig {
        PageConfig::from_value(json!({
            "options": {
                "reqChar": "*",
                "signup": { "reqChar": "^", "fMsgFormat": "container", "fMsgContainer": "errors" }
            },
            "plugins": {
                "ip4address": { "_extends": "GenericTextField", "regex": "^[0-9.]+$" }
            },
            "translation": {
                "de": {
                    "defaults": { "successMessage": "Fertig" },
                    "email": { "errorMessage": "Ungültige E-Mail" }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_form_section_only_for_custom_forms() {
        let config = sample();

        let plain = config.options_for(Some("signup"), false).unwrap();
        assert_eq!(plain.req_char, "*");
        assert_eq!(plain.f_msg_format, FormMessageFormat::Alert);

        let custom = config.options_for(Some("signup"), true).unwrap();
        assert_eq!(custom.req_char, "^");
        assert_eq!(custom.f_msg_format, FormMessageFormat::Container);
        assert_eq!(custom.f_msg_container.as_deref(), Some("errors"));
    }

    #[test]
    fn test_missing_form_section_uses_global() {
        let config = sample();
        let options = config.options_for(Some("other"), true).unwrap();
        assert_eq!(options.req_char, "*");
    }

    #[test]
    fn test_translation_order_and_case() {
        let config = sample();

        let entries = config.translation_for("De", "email");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].success_message.as_deref(), Some("Fertig"));
        assert_eq!(entries[1].error_message.as_deref(), Some("Ungültige E-Mail"));

        assert_eq!(config.translation_for("DE", "phone").len(), 1);
        assert!(config.translation_for("FR", "email").is_empty());
    }

    #[test]
    fn test_plugins_parsed() {
        let config = sample();
        let (token, decl) = &config.plugins()[0];
        assert_eq!(token, "ip4address");
        assert_eq!(decl.extends, "GenericTextField");
        assert_eq!(decl.overrides.match_pattern.as_deref(), Some("^[0-9.]+$"));
    }

    #[test]
    fn test_plugins_keep_declaration_order() {
        let config = PageConfig::from_json(
            r#"{ "plugins": {
                "zip": { "_extends": "GenericTextField" },
                "email": { "_extends": "GenericTextField" },
                "address": { "_extends": "GenericTextField" },
                "zip": { "_extends": "PhoneField" }
            } }"#,
        )
        .unwrap();

        let tokens: Vec<&str> = config.plugins().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, ["zip", "email", "address"]);
        assert_eq!(config.plugins()[0].1.extends, "PhoneField");

        let decl = || PluginDecl {
            extends: "NameField".to_string(),
            overrides: FieldOverrides::default(),
        };
        let config = PageConfig::new().plugin("b", decl()).plugin("a", decl());
        assert_eq!(config.plugins()[0].0, "b");
    }

    #[test]
    fn test_callback_lookup_prefers_form() {
        let config = PageConfig::new()
            .on_form_errors(None, |_| false)
            .on_form_errors(Some("signup"), |_| true);

        let per_form = config.form_callback(Some("signup")).unwrap();
        assert!(per_form(&[]));

        let global = config.form_callback(Some("other")).unwrap();
        assert!(!global(&[]));

        assert!(config.field_callback(Some("signup")).is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            PageConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(PageConfig::from_json(r#"{ "plugins": { "x": { "regex": "a" } } }"#).is_err());
    }

    #[test]
    fn test_empty_document() {
        let config = PageConfig::from_json("{}").unwrap();
        assert_eq!(config.options_for(None, false).unwrap(), Options::default());
        assert!(config.plugins().is_empty());
    }
}
