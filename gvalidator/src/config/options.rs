//! Resolved per-form options.

use formdom::EventType;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use super::merge::merge_allowed;
use crate::error::ConfigError;

/// How field-level messages are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementMessageFormat {
    /// Message shown next to the field at all times.
    #[default]
    Open,
    /// Message hidden behind a status icon, toggled by `eMsgEventOn`/`eMsgEventOff`.
    Compact,
    /// Messages rendered as in `Open`, and the field-error callback runs on
    /// every error.
    Function,
}

/// How form-level failure is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMessageFormat {
    #[default]
    Alert,
    Container,
    Function,
}

/// Where the required marker goes relative to the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPlacement {
    /// First child of the field's parent.
    Before,
    /// Immediately in front of the field.
    #[default]
    After,
}

/// Class applied to fields in ERROR/EMPTY state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HighlightRepr")]
pub enum Highlight {
    Off,
    Class(String),
}

impl Default for Highlight {
    fn default() -> Self {
        Highlight::Class(DEFAULT_HIGHLIGHT_CLASS.to_string())
    }
}

const DEFAULT_HIGHLIGHT_CLASS: &str = "highlight";

#[derive(Deserialize)]
#[serde(untagged)]
enum HighlightRepr {
    Flag(bool),
    Class(String),
}

impl From<HighlightRepr> for Highlight {
    fn from(repr: HighlightRepr) -> Self {
        match repr {
            HighlightRepr::Flag(true) => Highlight::default(),
            HighlightRepr::Flag(false) => Highlight::Off,
            HighlightRepr::Class(class) if class.is_empty() => Highlight::Off,
            HighlightRepr::Class(class) => Highlight::Class(class),
        }
    }
}

/// Status icon image sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Icons {
    pub ok: String,
    pub info: String,
    pub error: String,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            ok: "../images/icons/tick.png".to_string(),
            info: "../images/icons/help.png".to_string(),
            error: "../images/icons/icon_alert.gif".to_string(),
        }
    }
}

/// Options for one form, resolved once when the form is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub icons: Icons,
    pub req_show: bool,
    pub req_char: String,
    pub req_placement: RequiredPlacement,
    pub auto_focus: bool,
    #[serde(rename = "supressAlert")]
    pub suppress_alert: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub highlight_fields: Highlight,
    #[serde(deserialize_with = "null_as_default")]
    pub e_msg_format: ElementMessageFormat,
    #[serde(deserialize_with = "event_type")]
    pub e_msg_event_on: EventType,
    #[serde(default, deserialize_with = "optional_event_type")]
    pub e_msg_event_off: Option<EventType>,
    pub f_msg: String,
    #[serde(deserialize_with = "null_as_default")]
    pub f_msg_format: FormMessageFormat,
    #[serde(default)]
    pub f_msg_container: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            icons: Icons::default(),
            req_show: true,
            req_char: "*".to_string(),
            req_placement: RequiredPlacement::After,
            auto_focus: true,
            suppress_alert: false,
            highlight_fields: Highlight::default(),
            e_msg_format: ElementMessageFormat::Open,
            e_msg_event_on: EventType::Click,
            e_msg_event_off: None,
            f_msg: "Please correct the highlighted errors.".to_string(),
            f_msg_format: FormMessageFormat::Alert,
            f_msg_container: None,
        }
    }
}

impl Options {
    /// The built-in defaults as an option tree, the base every merge starts
    /// from.
    pub fn defaults_tree() -> Value {
        json!({
            "icons": {
                "ok": "../images/icons/tick.png",
                "info": "../images/icons/help.png",
                "error": "../images/icons/icon_alert.gif"
            },
            "reqShow": true,
            "reqChar": "*",
            "reqPlacement": "after",
            "autoFocus": true,
            "supressAlert": false,
            "highlightFields": DEFAULT_HIGHLIGHT_CLASS,
            "eMsgFormat": "open",
            "eMsgEventOn": "click",
            "eMsgEventOff": null,
            "fMsg": "Please correct the highlighted errors.",
            "fMsgFormat": "alert",
            "fMsgContainer": null
        })
    }

    /// Resolve options: defaults, then the global section, then the form
    /// section, each merged through the allow-list.
    pub fn resolve(global: Option<&Value>, form: Option<&Value>) -> Result<Self, ConfigError> {
        let mut tree = Self::defaults_tree();
        for section in [global, form].into_iter().flatten() {
            merge_allowed(&mut tree, section);
        }
        serde_json::from_value(tree).map_err(ConfigError::InvalidOptions)
    }

    pub fn is_compact(&self) -> bool {
        self.e_msg_format == ElementMessageFormat::Compact
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn event_type<'de, D>(deserializer: D) -> Result<EventType, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

fn optional_event_type<'de, D>(deserializer: D) -> Result<Option<EventType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(name) if !name.is_empty() => name.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
