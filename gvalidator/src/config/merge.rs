//! Allow-listed recursive merge of option trees.

use log::debug;
use serde_json::{Map, Value};

/// Option keys a page (or a form section) may set. `error`, `info` and `ok`
/// are the keys nested under `icons`.
pub const ALLOWED_KEYS: &[&str] = &[
    "autoFocus",
    "eMsgEventOn",
    "eMsgEventOff",
    "eMsgFormat",
    "icons",
    "error",
    "info",
    "ok",
    "eMsgFunction",
    "fMsg",
    "fMsgFormat",
    "fMsgContainer",
    "fMsgFunction",
    "reqShow",
    "reqChar",
    "reqPlacement",
    "supressAlert",
    "highlightFields",
];

/// Merge `overrides` into `target`.
///
/// Only allow-listed keys are admitted. Object values are merged
/// recursively; every other value overwrites. Unknown keys (including the
/// per-form sections nested inside the global options) are dropped.
pub fn merge_allowed(target: &mut Value, overrides: &Value) {
    let Some(overrides) = overrides.as_object() else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(target) = target.as_object_mut() else {
        return;
    };

    for (key, value) in overrides {
        if !ALLOWED_KEYS.contains(&key.as_str()) {
            debug!("[gvalidator] dropping unrecognised option '{key}'");
            continue;
        }
        if value.is_object() {
            let slot = target.entry(key.clone()).or_insert(Value::Null);
            merge_allowed(slot, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
