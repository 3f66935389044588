//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod store;
pub use store::{use_store, StoreProvider};

pub mod notifications;
pub use notifications::{notify, use_notices, NoticeLevel, NoticeLog, NoticeProvider, Toaster};

mod hero;
pub use hero::{Hero, COMMUNITY_NAME};

mod registration_form;
pub use registration_form::RegistrationForm;

mod admin_dashboard;
pub use admin_dashboard::AdminDashboard;
