use std::fmt;
use std::str::FromStr;

/// DOM events a listener can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Blur,
    Click,
    Change,
    Submit,
    Reset,
    MouseOver,
    MouseOut,
}

impl EventType {
    /// The DOM event name, e.g. `"mouseover"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Blur => "blur",
            EventType::Click => "click",
            EventType::Change => "change",
            EventType::Submit => "submit",
            EventType::Reset => "reset",
            EventType::MouseOver => "mouseover",
            EventType::MouseOut => "mouseout",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an event name is not one of [`EventType`]'s names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventTypeError(pub String);

impl fmt::Display for ParseEventTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type '{}'", self.0)
    }
}

impl std::error::Error for ParseEventTypeError {}

impl FromStr for EventType {
    type Err = ParseEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the legacy `onclick` spelling as well
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("on").unwrap_or(&name);
        match name {
            "blur" => Ok(EventType::Blur),
            "click" => Ok(EventType::Click),
            "change" => Ok(EventType::Change),
            "submit" => Ok(EventType::Submit),
            "reset" => Ok(EventType::Reset),
            "mouseover" => Ok(EventType::MouseOver),
            "mouseout" => Ok(EventType::MouseOut),
            _ => Err(ParseEventTypeError(s.to_string())),
        }
    }
}

/// Handle for one registered listener. Ids grow monotonically, so ordering
/// by id is attach order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__listener_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_names() {
        assert_eq!("mouseover".parse::<EventType>(), Ok(EventType::MouseOver));
        assert_eq!("onclick".parse::<EventType>(), Ok(EventType::Click));
        assert_eq!(" Blur ".parse::<EventType>(), Ok(EventType::Blur));
        assert!("hover".parse::<EventType>().is_err());
    }

    #[test]
    fn test_display_round_trips_name() {
        for event in [EventType::Change, EventType::Reset, EventType::MouseOut] {
            assert_eq!(event.to_string().parse::<EventType>(), Ok(event));
        }
    }
}
