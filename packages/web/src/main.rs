use dioxus::prelude::*;

use ui::{NoticeProvider, StoreProvider};
use views::{Admin, Home};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Home {},
    #[route("/admin")]
    Admin {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(launch_server()),
            Err(e) => {
                eprintln!("failed to start runtime: {e}");
                std::process::exit(1);
            }
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() {
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tracing_subscriber::EnvFilter;

    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = match api::Settings::load() {
        Ok(settings) => settings,
        Err(e) => fatal("invalid configuration", e),
    };

    // Connect the store and start the insert listener
    let store = match api::db::init_store(&settings).await {
        Ok(store) => store,
        Err(e) => fatal("failed to connect to database", e),
    };

    if let Err(e) = sqlx::migrate!("../api/migrations").run(store.pool()).await {
        fatal("failed to run migrations", e);
    }

    let router = axum::Router::new().serve_dioxus_application(ServeConfig::new(), App);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => fatal("failed to bind listener", e),
    };
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router.into_make_service()).await {
        fatal("server stopped", e);
    }
}

#[cfg(feature = "server")]
fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!(error = %err, "{context}");
    std::process::exit(1);
}

#[component]
fn App() -> Element {
    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        StoreProvider {
            NoticeProvider {
                Router::<Route> {}
            }
        }
    }
}
