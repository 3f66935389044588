//! Registration store singleton using the OnceCell pattern.

use roster::StoreError;
use tokio::sync::OnceCell;

use super::PgStore;
use crate::Settings;

static STORE: OnceCell<PgStore> = OnceCell::const_new();

/// Connect and start the insert listener. Later calls return the same store.
pub async fn init_store(settings: &Settings) -> Result<&'static PgStore, sqlx::Error> {
    STORE
        .get_or_try_init(|| async {
            let store = PgStore::connect(settings).await?;
            store.start_listener().await?;
            Ok(store)
        })
        .await
}

/// The store created by [`init_store`].
pub fn store() -> Result<&'static PgStore, StoreError> {
    STORE
        .get()
        .ok_or_else(|| StoreError::Transport("registration store is not initialised".into()))
}
