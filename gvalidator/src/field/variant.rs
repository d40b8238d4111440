//! Built-in field variants and their behavior records.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::pattern::Pattern;
use crate::config::FieldOverrides;
use crate::error::RegistryError;

/// How a field decides whether it holds a value and whether that value
/// passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A single text control checked against a pattern.
    TextPattern,
    /// A select box: a non-empty selected value passes.
    Choice,
    /// Same-named checkboxes: any checked member passes.
    CheckboxGroup,
    /// Same-named radio buttons: any checked member passes.
    RadioGroup,
    /// Text checked for character set only; the real check happens elsewhere.
    CaptchaLike,
    /// Text that must pass its pattern and equal another field's value.
    PasswordConfirm,
}

impl FieldKind {
    pub fn is_group(self) -> bool {
        matches!(self, FieldKind::CheckboxGroup | FieldKind::RadioGroup)
    }
}

/// Named base variants that class tokens map onto. Plugins extend these by
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantTag {
    ComboBox,
    Checkbox,
    RadioButton,
    NameField,
    PhoneField,
    PasswordField,
    ConfirmPasswordField,
    EmailField,
    GenericTextField,
    CaptchaTextField,
    RecaptchaTextField,
}

impl VariantTag {
    pub const ALL: [VariantTag; 11] = [
        VariantTag::ComboBox,
        VariantTag::Checkbox,
        VariantTag::RadioButton,
        VariantTag::NameField,
        VariantTag::PhoneField,
        VariantTag::PasswordField,
        VariantTag::ConfirmPasswordField,
        VariantTag::EmailField,
        VariantTag::GenericTextField,
        VariantTag::CaptchaTextField,
        VariantTag::RecaptchaTextField,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantTag::ComboBox => "ComboBox",
            VariantTag::Checkbox => "Checkbox",
            VariantTag::RadioButton => "RadioButton",
            VariantTag::NameField => "NameField",
            VariantTag::PhoneField => "PhoneField",
            VariantTag::PasswordField => "PasswordField",
            VariantTag::ConfirmPasswordField => "ConfirmPasswordField",
            VariantTag::EmailField => "EmailField",
            VariantTag::GenericTextField => "GenericTextField",
            VariantTag::CaptchaTextField => "CaptchaTextField",
            VariantTag::RecaptchaTextField => "RecaptchaTextField",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            VariantTag::ComboBox => FieldKind::Choice,
            VariantTag::Checkbox => FieldKind::CheckboxGroup,
            VariantTag::RadioButton => FieldKind::RadioGroup,
            VariantTag::ConfirmPasswordField => FieldKind::PasswordConfirm,
            VariantTag::CaptchaTextField | VariantTag::RecaptchaTextField => FieldKind::CaptchaLike,
            VariantTag::NameField
            | VariantTag::PhoneField
            | VariantTag::PasswordField
            | VariantTag::EmailField
            | VariantTag::GenericTextField => FieldKind::TextPattern,
        }
    }

    /// A fresh copy of the variant's built-in behavior.
    pub fn behavior(self) -> Behavior {
        let base = Behavior::new(self.kind());
        match self {
            VariantTag::ComboBox | VariantTag::Checkbox | VariantTag::RadioButton => base,
            VariantTag::NameField => base
                .matching(&NAME_MATCH)
                .sanitizing(&NAME_SANITIZE)
                .error("Your name must be between 2 and 30 characters")
                .context("Please enter your name"),
            VariantTag::PhoneField => {
                let hint = "Your phone number needs to be at least 8 digits long i.e. 03 1234 5678";
                base.matching(&PHONE_MATCH)
                    .sanitizing(&PHONE_SANITIZE)
                    .error(hint)
                    .context(hint)
            }
            VariantTag::PasswordField => {
                let hint = "Please enter a password at least 8 characters in length using digits, lower and uppercase letters";
                base.matching(&PASSWORD_MATCH).error(hint).context(hint)
            }
            VariantTag::ConfirmPasswordField => base
                .matching(&PASSWORD_MATCH)
                .error("Please confirm your password")
                .context("Please confirm your password"),
            VariantTag::EmailField => base
                .matching(&EMAIL_MATCH)
                .error("Please enter a valid email address i.e. user@domain.com")
                .context("Your email address will be kept confidential"),
            VariantTag::GenericTextField => base.sanitizing(&MARKUP_SANITIZE),
            VariantTag::CaptchaTextField => base
                .matching(&CAPTCHA_MATCH)
                .sanitizing(&MARKUP_SANITIZE)
                .success("Thankyou.")
                .error("Please complete the security check")
                .context("This prevents us from spam"),
            VariantTag::RecaptchaTextField => base
                .matching(&CAPTCHA_MATCH)
                .sanitizing(&MARKUP_SANITIZE)
                .success("Thankyou.")
                .error("Please complete. [Get another <a href='javascript:Recaptcha.reload()'>CAPTCHA</a>]")
                .context("Need some <a href='javascript:Recaptcha.showhelp()'>help</a>? Get another <a href='javascript:Recaptcha.reload()'>CAPTCHA</a>"),
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantTag {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| RegistryError::UnknownVariant(s.to_string()))
    }
}

// Built-in patterns. These are constants, so a failure to compile is a bug.
static NAME_MATCH: LazyLock<Pattern> = LazyLock::new(|| builtin(&[r"^[a-zA-Z\-'\s]{2,30}$"]));
static NAME_SANITIZE: LazyLock<Regex> = LazyLock::new(|| builtin_regex(r"[^a-zA-Z\-'\s]"));
static PHONE_MATCH: LazyLock<Pattern> = LazyLock::new(|| builtin(&[r"^[0-9]{8,10}$"]));
static PHONE_SANITIZE: LazyLock<Regex> = LazyLock::new(|| builtin_regex(r"[^0-9]"));
static PASSWORD_MATCH: LazyLock<Pattern> =
    LazyLock::new(|| builtin(&[r"^.{8,}$", r"[a-z]", r"[A-Z]", r"[0-9]|[^A-Za-z0-9_]"]));
static EMAIL_MATCH: LazyLock<Pattern> =
    LazyLock::new(|| builtin(&[r"(?i)^[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,4}$"]));
static CAPTCHA_MATCH: LazyLock<Pattern> = LazyLock::new(|| builtin(&[r"^[A-Za-z0-9\-_]+$"]));
static MARKUP_SANITIZE: LazyLock<Regex> = LazyLock::new(|| builtin_regex(r"[<>/\\();]"));

fn builtin(patterns: &[&str]) -> Pattern {
    Pattern::all_of(patterns).expect("Invalid built-in pattern")
}

fn builtin_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid built-in pattern")
}

/// User-facing messages of one field. `empty` may contain `%field%`, replaced
/// by the field's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub success: String,
    pub error: String,
    pub context: String,
    pub empty: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            success: "Completed".to_string(),
            error: "Please complete".to_string(),
            context: "Please complete".to_string(),
            empty: "%field% is required, please complete".to_string(),
        }
    }
}

/// The per-variant record a [`FieldValidator`](super::FieldValidator) is
/// parameterized by.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub kind: FieldKind,
    /// `None` means any value passes.
    pub match_pattern: Option<Pattern>,
    /// Characters matching this are stripped before matching.
    pub sanitize_pattern: Option<Regex>,
    pub messages: Messages,
}

impl Behavior {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            match_pattern: None,
            sanitize_pattern: None,
            messages: Messages::default(),
        }
    }

    fn matching(mut self, pattern: &Pattern) -> Self {
        self.match_pattern = Some(pattern.clone());
        self
    }

    fn sanitizing(mut self, pattern: &Regex) -> Self {
        self.sanitize_pattern = Some(pattern.clone());
        self
    }

    fn success(mut self, message: &str) -> Self {
        self.messages.success = message.to_string();
        self
    }

    fn error(mut self, message: &str) -> Self {
        self.messages.error = message.to_string();
        self
    }

    fn context(mut self, message: &str) -> Self {
        self.messages.context = message.to_string();
        self
    }

    /// Apply plugin or translation overrides. Only set entries replace the
    /// current values.
    pub fn apply(&mut self, overrides: &Overrides) {
        let messages = &mut self.messages;
        for (slot, value) in [
            (&mut messages.success, &overrides.success_message),
            (&mut messages.error, &overrides.error_message),
            (&mut messages.context, &overrides.context_message),
            (&mut messages.empty, &overrides.empty_message),
        ] {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        if let Some(pattern) = &overrides.match_pattern {
            self.match_pattern = Some(pattern.clone());
        }
        if let Some(pattern) = &overrides.sanitize_pattern {
            self.sanitize_pattern = Some(pattern.clone());
        }
    }
}

/// [`FieldOverrides`] with their patterns compiled.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub context_message: Option<String>,
    pub empty_message: Option<String>,
    pub match_pattern: Option<Pattern>,
    pub sanitize_pattern: Option<Regex>,
}

impl Overrides {
    pub fn compile(source: &FieldOverrides) -> Result<Self, regex::Error> {
        Ok(Self {
            success_message: source.success_message.clone(),
            error_message: source.error_message.clone(),
            context_message: source.context_message.clone(),
            empty_message: source.empty_message.clone(),
            match_pattern: source.match_pattern.as_deref().map(Pattern::new).transpose()?,
            sanitize_pattern: source.sanitize_pattern.as_deref().map(Regex::new).transpose()?,
        })
    }
}
