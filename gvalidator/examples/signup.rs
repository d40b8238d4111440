use std::fs::File;
use std::thread;

use gvalidator::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

const CONFIG: &str = r#"{
    "options": {
        "fMsgFormat": "container",
        "fMsgContainer": "problems",
        "signup": { "reqChar": "(required)" }
    },
    "plugins": {
        "postcode": {
            "_extends": "GenericTextField",
            "regex": "^[0-9]{4}$",
            "cleanRegex": "[^0-9]",
            "errorMessage": "Postcodes are four digits",
            "contextMessage": "Where should we send the welcome pack?"
        }
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("signup.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = PageConfig::from_json(CONFIG)?;
    let mut doc = Document::new(page());
    let mut session = ValidationSession::new(ValidatorRegistry::with_builtins(), config);

    let forms = session.start(&mut doc);
    println!("validating {forms} form(s)");

    thread::sleep(ValidationSession::<Document>::FOCUS_DELAY);
    if let Some(focused) = session.apply_focus(&mut doc) {
        println!("focused {:?}", doc.attribute(focused, "name"));
    }

    let form = doc.element_by_id("signup").ok_or("signup form missing")?;

    // A first attempt with a bad email and no name
    set(&mut doc, "email", "ada@")?;
    set(&mut doc, "postcode", "20 00")?;
    submit(&mut session, &mut doc, form);

    // Fix everything and try again
    set(&mut doc, "email", "ada@example.com")?;
    set(&mut doc, "name", "Ada Lovelace")?;
    let newsletter = doc.element_by_id("news-yes").ok_or("newsletter option missing")?;
    doc.set_checked(newsletter, true);
    for outcome in session.trigger(&mut doc, newsletter, EventType::Click) {
        println!("{outcome:?}");
    }
    submit(&mut session, &mut doc, form);

    session.detach(&mut doc);
    Ok(())
}

fn set(doc: &mut Document, id: &str, value: &str) -> Result<(), String> {
    let node = doc.element_by_id(id).ok_or_else(|| format!("no element #{id}"))?;
    doc.set_value(node, value);
    Ok(())
}

fn submit(session: &mut ValidationSession<Document>, doc: &mut Document, form: NodeId) {
    for outcome in session.trigger(doc, form, EventType::Submit) {
        match outcome {
            Dispatch::Submit { allowed: true } => println!("submitted"),
            Dispatch::Submit { allowed: false } => {
                println!("blocked:");
                if let Some(controller) = session.form("signup") {
                    for error in controller.errors() {
                        println!("  {}: {}", error.label, error.summary());
                    }
                }
            }
            other => println!("{other:?}"),
        }
    }
    for alert in doc.take_alerts() {
        println!("alert: {alert}");
    }
}

fn row(label: &str, input: Element) -> Element {
    let id = input.attr_value("id").unwrap_or_default().to_string();
    Element::div().child(Element::label(id, label)).child(input)
}

fn page() -> Element {
    Element::div()
        .child(Element::div().id("problems").class("hidden"))
        .child(
            Element::form()
                .id("signup")
                .class("gform custom")
                .child(row(
                    "Email",
                    Element::input("text").id("email").name("email").class("email required"),
                ))
                .child(row(
                    "Name",
                    Element::input("text").id("name").name("name").class("name required"),
                ))
                .child(row(
                    "Postcode",
                    Element::input("text").id("postcode").name("postcode").class("postcode"),
                ))
                .child(
                    Element::fieldset()
                        .child(Element::legend("Newsletter"))
                        .child(
                            Element::input("radio")
                                .id("news-yes")
                                .name("newsletter")
                                .value("yes")
                                .class("radio required"),
                        )
                        .child(
                            Element::input("radio")
                                .id("news-no")
                                .name("newsletter")
                                .value("no")
                                .class("radio required"),
                        ),
                )
                .child(Element::input("submit").value("Sign up")),
        )
}
