//! Landing page: hero and the registration form.

use dioxus::prelude::*;
use ui::{Hero, RegistrationForm};

use crate::Route;

#[component]
pub fn Home() -> Element {
    rsx! {
        nav {
            class: "site-nav",
            Link { class: "site-nav-link", to: Route::Admin {}, "Admin" }
        }
        main {
            class: "home",
            Hero {}
            RegistrationForm {}
        }
    }
}
