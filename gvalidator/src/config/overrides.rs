use serde::Deserialize;

/// The restricted set of field properties that plugins and translations may
/// override. Anything else in a declaration is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverrides {
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub success_message: Option<String>,
    #[serde(default)]
    pub context_message: Option<String>,
    #[serde(default)]
    pub empty_message: Option<String>,
    #[serde(default, alias = "regex")]
    pub match_pattern: Option<String>,
    #[serde(default, alias = "cleanRegex")]
    pub sanitize_pattern: Option<String>,
}

impl FieldOverrides {
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn context_message(mut self, message: impl Into<String>) -> Self {
        self.context_message = Some(message.into());
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = Some(message.into());
        self
    }

    pub fn match_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.match_pattern = Some(pattern.into());
        self
    }

    pub fn sanitize_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.sanitize_pattern = Some(pattern.into());
        self
    }
}

/// One entry of the page's plugin map: a new class token built on a base
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginDecl {
    #[serde(rename = "_extends")]
    pub extends: String,
    #[serde(flatten)]
    pub overrides: FieldOverrides,
}
