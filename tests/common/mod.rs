//! Common test utilities

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use warden_core::auth::{hash_password, MemoryPrincipalStorage, PrincipalStorage, ProviderSet};
use warden_core::config::{AuthConfig, Config, SessionConfig};
use warden_core::domain::NewPrincipal;
use warden_core::server::{build_router, AppState};
use warden_core::session::{MemorySessionStore, SessionStore};
use warden_core::view::{ManifestTemplateResolver, TemplateResolver};

/// Seeded accounts, one per provider: (provider, username, password)
pub const ACCOUNTS: &[(&str, &str, &str)] = &[
    ("admins", "root", "toor"),
    ("users", "jane", "password123"),
    ("developers", "dev", "devpass"),
];

#[allow(dead_code)]
pub struct TestApp {
    pub addr: SocketAddr,
}

#[allow(dead_code)]
impl TestApp {
    /// Create a test configuration
    pub fn test_config() -> Config {
        Config {
            http_host: "127.0.0.1".to_string(),
            http_port: 0, // Random port
            session: SessionConfig {
                cookie_name: "warden.sid".to_string(),
                ttl_secs: 3600,
                debug: true,
            },
            auth: AuthConfig::default_tree(),
            default_controller: "home".to_string(),
            // Templates are injected through the manifest below.
            view_root: PathBuf::from("unused-view-root"),
        }
    }

    /// Template manifest covering the stock domains.
    ///
    /// Developer/Home is deliberately absent so tests can exercise the
    /// missing-template fallback against a real route.
    pub fn default_templates() -> ManifestTemplateResolver {
        let mut manifest = ManifestTemplateResolver::new();
        for domain in ["Admin", "User", "Developer"] {
            manifest.insert(
                format!("{domain}/Login/index"),
                "<h1>{{ title }}</h1><div class=\"flash\">{{ error }}</div>\
                 <form method=\"post\"><input name=\"username\"><input name=\"password\"></form>",
            );
            manifest.insert(
                format!("{domain}/Dashboard/index"),
                "<h1>{{ title }}</h1><p>Signed in as {{ username }}</p>",
            );
        }
        manifest.insert("Admin/Home/index", "<h1>{{ title }}</h1><p>Admin area</p>");
        manifest.insert("User/Home/index", "<h1>{{ title }}</h1><p>Welcome</p>");
        manifest.insert(
            "Error",
            "<h1>{{ message }}</h1><a href=\"/{{ home }}\">home</a>",
        );
        manifest
    }

    pub async fn spawn() -> Self {
        Self::spawn_with(Self::test_config(), Self::default_templates()).await
    }

    pub async fn spawn_with(config: Config, templates: ManifestTemplateResolver) -> Self {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(MemorySessionStore::new(config.session.ttl_secs));

        let mut providers = ProviderSet::new();
        for (provider, username, password) in ACCOUNTS {
            let storage = MemoryPrincipalStorage::new();
            storage
                .create(NewPrincipal {
                    username: username.to_string(),
                    password_hash: hash_password(password).expect("failed to hash password"),
                    attributes: serde_json::Map::new(),
                })
                .await
                .expect("failed to seed principal");
            providers.insert(*provider, Arc::new(storage) as Arc<dyn PrincipalStorage>);
        }

        let templates: Arc<dyn TemplateResolver> = Arc::new(templates);
        let state =
            AppState::new(config, sessions, providers, templates).expect("invalid test config");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, build_router(state))
                .await
                .expect("test server crashed");
        });

        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Client with a cookie store (for session flows) and redirects disabled
    /// (so tests can assert on Location headers).
    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build test client")
    }
}

/// Location header of a redirect response
#[allow(dead_code)]
pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("expected a Location header")
        .to_str()
        .unwrap()
}
