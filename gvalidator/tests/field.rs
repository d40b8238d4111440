use gvalidator::field::FieldContext;
use gvalidator::prelude::*;
use serde_json::json;

fn session(doc: &mut Document, config: PageConfig) -> ValidationSession<Document> {
    let mut session = ValidationSession::new(ValidatorRegistry::with_builtins(), config);
    session.start(doc);
    session
}

fn form_with(fields: Vec<Element>) -> Element {
    Element::form().id("f").class("gform").children(fields)
}

fn row(label: &str, input: Element) -> Element {
    let id = input.attr_value("id").unwrap_or_default().to_string();
    Element::div().child(Element::label(id, label)).child(input)
}

fn node(doc: &Document, id: &str) -> NodeId {
    doc.element_by_id(id).unwrap()
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn test_untouched_optional_field_settles_to_info() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.validate_field(&mut doc, "email"), Some(false));
    assert_eq!(form.field_by_name("email").unwrap().state(), FieldState::Info);

    form.field_by_name_mut("email").unwrap().set_modified(true);
    assert_eq!(form.validate_field(&mut doc, "email"), Some(false));
    assert_eq!(form.field_by_name("email").unwrap().state(), FieldState::Info);
}

#[test]
fn test_required_modified_blank_field_is_empty() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert!(form.field_by_name("email").unwrap().is_required());
    assert_eq!(form.field_by_name("email").unwrap().state(), FieldState::Info);

    form.field_by_name_mut("email").unwrap().set_modified(true);
    assert_eq!(form.validate_field(&mut doc, "email"), Some(false));

    let field = form.field_by_name("email").unwrap();
    assert_eq!(field.state(), FieldState::Empty);
    let span = field.message_span().unwrap();
    assert_eq!(doc.text(span), "'Email' is required, please complete");
    assert!(doc.has_class(span, "error"));
}

#[test]
fn test_pattern_pass_and_fail() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email").value("user@domain.com"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.validate_field(&mut doc, "email"), Some(true));
    assert_eq!(form.field_by_name("email").unwrap().state(), FieldState::Ok);

    doc.set_value(node(&doc, "email"), "not-an-email");
    assert_eq!(form.validate_field(&mut doc, "email"), Some(false));
    let field = form.field_by_name("email").unwrap();
    assert_eq!(field.state(), FieldState::Error);
    assert_eq!(
        doc.text(field.message_span().unwrap()),
        "Please enter a valid email address i.e. user@domain.com"
    );
}

#[test]
fn test_validate_is_idempotent() {
    let mut doc = Document::new(form_with(vec![row(
        "Phone",
        Element::input("text").id("phone").name("phone").class("phone required").value("03 1234 5678"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    let first = form.validate_field(&mut doc, "phone");
    let first_state = form.field_by_name("phone").unwrap().state();
    let second = form.validate_field(&mut doc, "phone");
    let second_state = form.field_by_name("phone").unwrap().state();

    assert_eq!(first, second);
    assert_eq!(first_state, second_state);
    assert_eq!(first, Some(true));
    assert_eq!(doc.value(node(&doc, "phone")), "0312345678");
}

#[test]
fn test_sanitize_then_match() {
    let mut doc = Document::new(form_with(vec![row(
        "Name",
        Element::input("text").id("name").name("name").class("name").value("<b>"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    // "b" is all that survives, and one letter is too short
    assert_eq!(form.validate_field(&mut doc, "name"), Some(false));
    assert_eq!(doc.value(node(&doc, "name")), "b");
    assert_eq!(form.field_by_name("name").unwrap().state(), FieldState::Error);
}

#[test]
fn test_reset_returns_to_reset_state() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    form.validate_all(&mut doc);
    assert_eq!(form.field_by_name("email").unwrap().state(), FieldState::Empty);

    form.reset(&mut doc);
    let field = form.field_by_name("email").unwrap();
    assert_eq!(field.state(), FieldState::Reset);
    assert!(!field.is_modified());
    assert!(!doc.has_class(node(&doc, "email"), "highlight"));
}

// ============================================================================
// Variants
// ============================================================================

#[test]
fn test_combo_box_presence() {
    let mut doc = Document::new(form_with(vec![row(
        "Country",
        Element::select()
            .id("country")
            .name("country")
            .class("select required")
            .child(Element::option("", "Choose..."))
            .child(Element::option("au", "Australia")),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.field_by_name("country").unwrap().kind(), FieldKind::Choice);
    assert!(!form.validate_all(&mut doc));
    assert_eq!(form.field_by_name("country").unwrap().state(), FieldState::Empty);

    doc.set_value(node(&doc, "country"), "au");
    assert!(form.validate_all(&mut doc));
    assert_eq!(form.field_by_name("country").unwrap().state(), FieldState::Ok);
}

#[test]
fn test_radio_group_uses_every_member() {
    let mut doc = Document::new(form_with(vec![
        Element::fieldset()
            .child(Element::legend("Colour"))
            .child(Element::input("radio").id("red").name("colour").value("red").class("radio required"))
            .child(Element::input("radio").id("blue").name("colour").value("blue").class("radio required")),
    ]));
    let mut session = session(&mut doc, PageConfig::default());

    {
        let form = session.form("f").unwrap();
        assert_eq!(form.fields().len(), 1);
        let field = form.field_by_name("colour").unwrap();
        assert_eq!(field.kind(), FieldKind::RadioGroup);
        assert_eq!(field.members().len(), 2);
        assert_eq!(field.label(), "Colour");
    }
    let blue = node(&doc, "blue");
    assert_eq!(doc.listeners(blue, EventType::Click).len(), 2);
    assert_eq!(doc.listeners(blue, EventType::Change).len(), 1);

    doc.set_checked(blue, true);
    let outcome = session.trigger(&mut doc, blue, EventType::Click);
    assert_eq!(
        outcome.first(),
        Some(&Dispatch::Field {
            name: "colour".to_string(),
            state: FieldState::Ok
        })
    );
}

#[test]
fn test_checkbox_group_empty_when_required() {
    let mut doc = Document::new(form_with(vec![
        Element::fieldset()
            .child(Element::legend("Terms"))
            .child(Element::input("checkbox").id("t1").name("terms").class("checkbox required"))
            .child(Element::input("checkbox").id("t2").name("terms").class("checkbox required")),
    ]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert!(!form.validate_all(&mut doc));
    assert_eq!(form.field_by_name("terms").unwrap().state(), FieldState::Empty);
    assert_eq!(form.errors()[0].empty_message, "'Terms' is required, please complete");

    doc.set_checked(node(&doc, "t2"), true);
    assert!(form.validate_all(&mut doc));
}

#[test]
fn test_confirm_password_compares_sibling() {
    let mut doc = Document::new(form_with(vec![
        row(
            "Password",
            Element::input("password").id("password").name("password").class("password required").value("Secret12"),
        ),
        row(
            "Confirm",
            Element::input("password").id("confirm").name("confirm").class("confirmpassword required").value("Secret12"),
        ),
    ]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.validate_field(&mut doc, "confirm"), Some(true));

    doc.set_value(node(&doc, "confirm"), "Secret13");
    assert_eq!(form.validate_field(&mut doc, "confirm"), Some(false));
    assert_eq!(form.field_by_name("confirm").unwrap().state(), FieldState::Error);
}

#[test]
fn test_confirm_password_custom_and_missing_sibling() {
    let mut doc = Document::new(form_with(vec![
        row("Secret", Element::input("password").id("pw1").name("pw1").value("Secret12")),
        row(
            "Confirm",
            Element::input("password")
                .id("confirm")
                .name("confirm")
                .class("confirmpassword")
                .attr("data-match", "pw1")
                .value("Secret12"),
        ),
        row(
            "Orphan",
            Element::input("password")
                .id("orphan")
                .name("orphan")
                .class("confirmpassword")
                .attr("data-match", "nowhere")
                .value("Secret12"),
        ),
    ]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.validate_field(&mut doc, "confirm"), Some(true));
    assert_eq!(form.validate_field(&mut doc, "orphan"), Some(false));
    assert_eq!(form.field_by_name("orphan").unwrap().state(), FieldState::Error);
}

#[test]
fn test_generic_text_always_passes_when_filled() {
    let mut doc = Document::new(form_with(vec![row(
        "Notes",
        Element::textarea().id("notes").name("notes").class("text required").value("a (b); c"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert!(form.validate_all(&mut doc));
    assert_eq!(doc.value(node(&doc, "notes")), "a b c");
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_open_mode_decorations() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let _session = session(&mut doc, PageConfig::default());

    let email = node(&doc, "email");
    let parent = doc.parent(email).unwrap();
    let children = doc.children(parent).to_vec();
    assert_eq!(children.len(), 4);
    assert_eq!(doc.tag_name(children[0]), "label");
    assert!(doc.has_class(children[1], "required"));
    assert_eq!(doc.text(children[1]), "*");
    assert_eq!(children[2], email);

    let msg = children[3];
    assert_eq!(doc.classes(msg), ["msg", "icon", "info"]);
    assert_eq!(doc.text(msg), "Your email address will be kept confidential");
}

#[test]
fn test_required_marker_before_and_optional_placeholder() {
    let config = PageConfig::new().options(json!({ "reqPlacement": "before" }));
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email"),
    )]));
    let _session = session(&mut doc, config);

    let parent = doc.parent(node(&doc, "email")).unwrap();
    let first = doc.first_child(parent).unwrap();
    assert!(doc.has_class(first, "required"));
    assert_eq!(doc.text(first), "&nbsp;");
}

#[test]
fn test_fields_sharing_a_parent_get_their_own_markers() {
    let mut doc = Document::new(form_with(vec![Element::div()
        .child(Element::input("text").id("email").name("email").class("email required"))
        .child(Element::input("text").id("phone").name("phone").class("phone"))]));
    let mut session = session(&mut doc, PageConfig::default());

    let email = node(&doc, "email");
    let phone = node(&doc, "phone");
    let parent = doc.parent(email).unwrap();
    let markers = |doc: &Document| -> Vec<NodeId> {
        doc.children(parent)
            .iter()
            .copied()
            .filter(|n| doc.tag_name(*n) == "span" && doc.has_class(*n, "required"))
            .collect()
    };

    let found = markers(&doc);
    assert_eq!(found.len(), 2);
    assert_eq!(doc.text(found[0]), "*");
    assert_eq!(doc.attribute(found[0], "data-required-for"), Some("email"));
    assert_eq!(doc.text(found[1]), "&nbsp;");
    assert_eq!(doc.attribute(found[1], "data-required-for"), Some("phone"));

    let children = doc.children(parent).to_vec();
    assert_eq!(children[..4], [found[0], email, found[1], phone]);

    // A restart rewrites each field's own marker in place
    session.start(&mut doc);
    let again = markers(&doc);
    assert_eq!(again, found);
    assert_eq!(doc.text(again[0]), "*");
    assert_eq!(doc.text(again[1]), "&nbsp;");
}

#[test]
fn test_req_show_off() {
    let config = PageConfig::new().options(json!({ "reqShow": false }));
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let _session = session(&mut doc, config);

    let form = node(&doc, "f");
    assert!(doc.elements_by_class(form, "required").iter().all(|n| doc.tag_name(*n) == "input"));
}

#[test]
fn test_existing_message_span_is_reused() {
    let mut doc = Document::new(form_with(vec![Element::div()
        .child(Element::input("text").id("email").name("email").class("email"))
        .child(Element::span().id("mine").class("msg"))]));
    let session = session(&mut doc, PageConfig::default());

    let field = session.form("f").unwrap().field_by_name("email").unwrap();
    assert_eq!(field.message_span(), doc.element_by_id("mine"));
    assert_eq!(doc.elements_by_class(node(&doc, "f"), "msg").len(), 1);
}

#[test]
fn test_compact_mode_icon_and_popup() {
    let config = PageConfig::new().options(json!({
        "eMsgFormat": "compact",
        "eMsgEventOn": "mouseover",
        "eMsgEventOff": "mouseout"
    }));
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, config);

    let (msg, icon) = {
        let field = session.form("f").unwrap().field_by_name("email").unwrap();
        (field.message_span().unwrap(), field.status_icon())
    };
    let link = icon.link.unwrap();
    let img = icon.img.unwrap();

    assert!(doc.has_class(msg, "hidden"));
    assert_eq!(doc.attribute(img, "src"), Some("../images/icons/help.png"));
    assert_eq!(
        doc.attribute(img, "title"),
        Some("Click for more information about this field.")
    );
    let status = doc.parent(link).unwrap();
    assert!(doc.has_class(status, "fieldstatus"));

    let shown = session.trigger(&mut doc, link, EventType::MouseOver);
    assert_eq!(
        shown,
        vec![Dispatch::Popup {
            name: "email".to_string(),
            visible: true
        }]
    );
    assert!(!doc.has_class(msg, "hidden"));

    session.trigger(&mut doc, link, EventType::MouseOut);
    assert!(doc.has_class(msg, "hidden"));

    let form = session.form_mut("f").unwrap();
    form.validate_all(&mut doc);
    assert_eq!(doc.attribute(img, "src"), Some("../images/icons/icon_alert.gif"));

    form.reset(&mut doc);
    assert!(doc.has_class(msg, "hidden"));
}

#[test]
fn test_shared_status_icon_toggles_once() {
    let config = PageConfig::new().options(json!({
        "eMsgFormat": "compact",
        "eMsgEventOn": "mouseover",
        "eMsgEventOff": "mouseout"
    }));
    let mut doc = Document::new(form_with(vec![Element::div()
        .child(Element::input("text").id("email").name("email").class("email required"))
        .child(Element::input("text").id("phone").name("phone").class("phone"))]));
    let mut session = session(&mut doc, config);

    let (msg, link) = {
        let form = session.form("f").unwrap();
        let email = form.field_by_name("email").unwrap();
        let phone = form.field_by_name("phone").unwrap();
        assert_eq!(email.status_icon(), phone.status_icon());
        (email.message_span().unwrap(), email.status_icon().link.unwrap())
    };
    assert_eq!(doc.elements_by_class(node(&doc, "f"), "fieldstatus").len(), 1);
    assert_eq!(doc.listeners(link, EventType::MouseOver).len(), 1);
    assert_eq!(doc.listeners(link, EventType::MouseOut).len(), 1);

    let shown = session.trigger(&mut doc, link, EventType::MouseOver);
    assert_eq!(
        shown,
        vec![Dispatch::Popup {
            name: "email".to_string(),
            visible: true
        }]
    );
    assert!(!doc.has_class(msg, "hidden"));

    session.trigger(&mut doc, link, EventType::MouseOut);
    assert!(doc.has_class(msg, "hidden"));

    // Still a single toggle after a restart
    session.start(&mut doc);
    assert_eq!(doc.listeners(link, EventType::MouseOver).len(), 1);
    assert_eq!(doc.listeners(link, EventType::MouseOut).len(), 1);
    assert_eq!(session.trigger(&mut doc, link, EventType::MouseOver).len(), 1);
    assert!(!doc.has_class(msg, "hidden"));
}

#[test]
fn test_highlight_follows_failure() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let email = node(&doc, "email");

    let form = session.form_mut("f").unwrap();
    form.validate_all(&mut doc);
    assert!(doc.has_class(email, "highlight"));

    doc.set_value(email, "user@domain.com");
    form.validate_all(&mut doc);
    assert!(!doc.has_class(email, "highlight"));
}

#[test]
fn test_highlight_disabled() {
    let config = PageConfig::new().options(json!({ "highlightFields": false }));
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, config);

    session.form_mut("f").unwrap().validate_all(&mut doc);
    assert!(!doc.has_class(node(&doc, "email"), "highlight"));
}

// ============================================================================
// Labels and listeners
// ============================================================================

#[test]
fn test_label_fallback() {
    let mut doc = Document::new(form_with(vec![Element::div()
        .child(Element::input("text").id("email").name("email").class("email required"))]));
    let mut session = session(&mut doc, PageConfig::default());
    let form = session.form_mut("f").unwrap();

    assert_eq!(form.field_by_name("email").unwrap().label(), "Field");
    form.validate_all(&mut doc);
    assert_eq!(form.errors()[0].empty_message, "'Field' is required, please complete");
}

#[test]
fn test_text_listeners() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email required"),
    )]));
    let mut session = session(&mut doc, PageConfig::default());
    let email = node(&doc, "email");

    assert_eq!(doc.listeners(email, EventType::Blur).len(), 1);
    assert_eq!(doc.listeners(email, EventType::Click).len(), 1);
    assert_eq!(doc.listeners(email, EventType::Change).len(), 1);

    // Change marks the field touched, so leaving it blank is now an error
    session.trigger(&mut doc, email, EventType::Change);
    let outcome = session.trigger(&mut doc, email, EventType::Blur);
    assert_eq!(
        outcome,
        vec![Dispatch::Field {
            name: "email".to_string(),
            state: FieldState::Empty
        }]
    );
}

#[test]
fn test_field_context_standalone() {
    let mut doc = Document::new(form_with(vec![row(
        "Email",
        Element::input("text").id("email").name("email").class("email"),
    )]));
    let registry = ValidatorRegistry::with_builtins();
    let options = Options::default();
    let form = node(&doc, "f");
    let cx = FieldContext::<Document>::new(form, &options);

    let mut field = registry
        .instantiate::<Document>("email", node(&doc, "email"), "email")
        .unwrap();
    let listeners = field.setup(&mut doc, &cx);
    assert_eq!(listeners.len(), 3);
    assert!(listeners.iter().any(|(_, action)| *action == FieldAction::ShowContext));

    doc.set_value(node(&doc, "email"), "user@domain.com");
    field.perform(&mut doc, &cx, FieldAction::Validate);
    assert_eq!(field.state(), FieldState::Ok);
}
