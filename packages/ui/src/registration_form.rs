//! Registration form bound to a [`Submitter`].

use dioxus::prelude::*;
use roster::{Field, RegistrationStore, SubmitError, Submitter, YearOfStudy};

use crate::hero::COMMUNITY_NAME;
use crate::notifications::{notify, use_notices, NoticeLevel};
use crate::store::use_store;

#[component]
pub fn RegistrationForm() -> Element {
    let store = use_store();
    let mut notices = use_notices();
    let mut submitter = use_signal(Submitter::new);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();

        // The write guard must be gone before the store call is awaited.
        let started = submitter.write().begin();
        let registration = match started {
            Ok(registration) => registration,
            Err(SubmitError::Busy) => return,
            Err(e) => {
                notify(&mut notices, NoticeLevel::Error, &e.to_string());
                return;
            }
        };

        spawn(async move {
            let outcome = store.create(registration).await;
            let settled = submitter.write().finish(outcome);
            match settled {
                Ok(_) => notify(
                    &mut notices,
                    NoticeLevel::Success,
                    &format!("Registration submitted successfully! Welcome to {COMMUNITY_NAME}!"),
                ),
                Err(e) => notify(&mut notices, NoticeLevel::Error, &e.to_string()),
            }
        });
    };

    let completed = submitter.read().draft().completed().len();
    let total = Field::ALL.len();
    let percent = completed * 100 / total;
    let in_flight = submitter.read().in_flight();
    let year = submitter.read().draft().get(Field::Year).to_string();
    let tech = submitter.read().draft().get(Field::TechKnowledge).to_string();

    rsx! {
        section {
            class: "registration",
            h2 { class: "registration-title", "Start Your Journey Today" }
            p {
                class: "registration-lede",
                "Register now for exclusive access to workshops, resources, and networking opportunities."
            }

            div {
                class: "registration-progress",
                div {
                    class: "registration-progress-bar",
                    style: "width: {percent}%",
                }
                span { "{completed}/{total} fields completed" }
            }

            form {
                class: "registration-form",
                onsubmit: handle_submit,

                TextField { submitter, field: Field::Name, kind: "text", placeholder: "Enter your full name" }
                TextField { submitter, field: Field::Mobile, kind: "tel", placeholder: "Enter your mobile number" }
                TextField { submitter, field: Field::Email, kind: "email", placeholder: "Enter your email address" }

                div {
                    class: "registration-row",
                    TextField { submitter, field: Field::College, kind: "text", placeholder: "Your college/university" }
                    TextField { submitter, field: Field::Course, kind: "text", placeholder: "e.g., Computer Science" }
                }

                label {
                    class: "registration-field",
                    span { {Field::Year.label()} }
                    select {
                        value: "{year}",
                        onchange: move |evt: FormEvent| submitter.write().set(Field::Year, evt.value()),
                        option { value: "", disabled: true, selected: year.is_empty(), "Select your year" }
                        for option_year in YearOfStudy::ALL {
                            option {
                                value: option_year.label(),
                                selected: year == option_year.label(),
                                "{option_year}"
                            }
                        }
                    }
                }

                label {
                    class: "registration-field",
                    span { {Field::TechKnowledge.label()} }
                    textarea {
                        rows: 4,
                        placeholder: "Tell us about your programming languages, frameworks, and tech interests...",
                        value: "{tech}",
                        oninput: move |evt: FormEvent| submitter.write().set(Field::TechKnowledge, evt.value()),
                    }
                }

                button {
                    class: "registration-submit",
                    r#type: "submit",
                    disabled: in_flight,
                    if in_flight { "Submitting Registration..." } else { "Join {COMMUNITY_NAME}" }
                }
            }
        }
    }
}

#[component]
fn TextField(
    mut submitter: Signal<Submitter>,
    field: Field,
    kind: &'static str,
    placeholder: &'static str,
) -> Element {
    let value = submitter.read().draft().get(field).to_string();
    let done = submitter.read().draft().completed().contains(&field);

    rsx! {
        label {
            class: if done { "registration-field registration-field--done" } else { "registration-field" },
            span { {field.label()} }
            input {
                r#type: kind,
                placeholder,
                value: "{value}",
                oninput: move |evt: FormEvent| submitter.write().set(field, evt.value()),
            }
        }
    }
}
