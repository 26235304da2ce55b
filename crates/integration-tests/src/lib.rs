//! Integration tests for the Emporium storefront.
//!
//! Each test serves the real storefront router against [`MockBackend`], an
//! in-memory commerce API, and drives it over HTTP with a cookie-keeping
//! client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

pub mod mock;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use emporium_core::Locale;
use emporium_storefront::config::{BackendConfig, DisplayConfig, StorefrontConfig};
use emporium_storefront::state::AppState;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, redirect};
use secrecy::SecretString;

pub use mock::{ADMIN_EMAIL, MockBackend, PASSWORD, SHOPPER_EMAIL};

/// High-entropy signing secret for test sessions.
const TEST_SESSION_SECRET: &str =
    "k9Qz2Lw7Vx4Rt1Pm8Nb3Hc6Jd5Fg0Sa2Ye7Ui4Oo1Wq9Er3Ty6Mn8Bv5Cx2Zl7Kj4Hg1Fd0Sa";

/// Distinct client address per app so auth rate limits never collide.
static NEXT_CLIENT: AtomicU8 = AtomicU8::new(1);

/// A storefront served on an ephemeral port, plus its mock backend.
pub struct TestApp {
    pub url: String,
    pub client: Client,
    pub backend: MockBackend,
    client_ip: String,
}

impl TestApp {
    /// Spawn a mock backend and a storefront pointed at it.
    ///
    /// # Panics
    ///
    /// Panics if either server cannot start.
    pub async fn spawn() -> Self {
        let backend = MockBackend::spawn().await;

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_secret: SecretString::from(TEST_SESSION_SECRET),
            backend: BackendConfig {
                timeout: Duration::from_secs(5),
                ..BackendConfig::with_url(&backend.url()).expect("mock backend url")
            },
            display: DisplayConfig {
                default_locale: Locale::En,
                ..DisplayConfig::default()
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("app state");
        let app = emporium_storefront::app(state).expect("router");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr = listener.local_addr().expect("storefront address");
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("http client");

        let octet = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
        Self {
            url: format!("http://{addr}"),
            client,
            backend,
            client_ip: format!("10.0.0.{octet}"),
        }
    }

    /// GET a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.url))
            .header("x-forwarded-for", &self.client_ip)
            .send()
            .await
            .expect("GET request")
    }

    /// GET a path and return the body text.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("response body")
    }

    /// POST a form to a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{path}", self.url))
            .header("x-forwarded-for", &self.client_ip)
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// Sign in through the login form.
    pub async fn login(&self, email: &str) -> Response {
        self.post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await
    }

    /// Add `quantity` of a product to the cart.
    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Response {
        let quantity = quantity.to_string();
        self.post_form(
            "/cart/add",
            &[("product_id", product_id), ("quantity", &quantity)],
        )
        .await
    }
}

/// The `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the header is missing or not text.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect location")
        .to_string()
}
