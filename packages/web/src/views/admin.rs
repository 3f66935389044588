//! Admin page. Nothing sits in front of it; anyone with the URL can view the roster.

use dioxus::prelude::*;
use ui::AdminDashboard;

use crate::Route;

#[component]
pub fn Admin() -> Element {
    rsx! {
        nav {
            class: "site-nav",
            Link { class: "site-nav-link", to: Route::Home {}, "Home" }
        }
        main {
            class: "admin",
            AdminDashboard {}
        }
    }
}
