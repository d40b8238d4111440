/// Declarative description of an HTML element and its subtree.
///
/// Elements are plain values built with chained setters and then handed to
/// [`Document::new`](crate::Document::new), which flattens them into an arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    // Identity
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub classes: Vec<String>,

    // Content
    pub text: String,
    pub children: Vec<Element>,

    // Form control state
    pub value: Option<String>,
    pub checked: bool,
    pub selected: bool,
    pub disabled: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn form() -> Self {
        Self::new("form")
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn span() -> Self {
        Self::new("span")
    }

    pub fn fieldset() -> Self {
        Self::new("fieldset")
    }

    pub fn legend(text: impl Into<String>) -> Self {
        Self::new("legend").text(text)
    }

    /// A `<label>` pointing at the control with the given id.
    pub fn label(for_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new("label").attr("for", for_id).text(text)
    }

    /// An `<input>` of the given `type`.
    pub fn input(input_type: impl Into<String>) -> Self {
        Self::new("input").attr("type", input_type)
    }

    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    pub fn select() -> Self {
        Self::new("select")
    }

    /// An `<option>` with an explicit value and display text.
    pub fn option(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new("option").attr("value", value).text(text)
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self::new("button").text(text)
    }

    // Identity
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.attr("name", name)
    }

    /// Add one or more space-separated class names.
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    // Content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    // Form control state
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}
