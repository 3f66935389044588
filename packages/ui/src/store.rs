//! Store context for the registration components.

use api::RemoteStore;
use dioxus::prelude::*;

/// The store the components talk to.
pub fn use_store() -> RemoteStore {
    use_context::<RemoteStore>()
}

/// Provider component for the registration store.
/// Wrap any tree that renders [`crate::RegistrationForm`] or [`crate::AdminDashboard`].
#[component]
pub fn StoreProvider(children: Element) -> Element {
    use_context_provider(RemoteStore::new);

    rsx! {
        {children}
    }
}
