use mailchimp_ajax::configuration::get_configuration;
use mailchimp_ajax::configuration::Settings;
use mailchimp_ajax::configuration::SettingsSource;
use mailchimp_ajax::domain::SubscribeResponse;
use mailchimp_ajax::domain::SUBSCRIBE_ACTION;
use mailchimp_ajax::lifecycle::activate;
use mailchimp_ajax::nonce::NonceIssuer;
use mailchimp_ajax::settings::SettingsRecord;
use mailchimp_ajax::startup::Application;
use mailchimp_ajax::telemetry::get_subscriber;
use mailchimp_ajax::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use secrecy::Secret;
use wiremock::MockServer;

/// Init a static subscriber using the `once_cell` crate.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different types, hence the duplicated arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber).unwrap();
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber).unwrap();
        }
    };
});

pub const API_KEY: &str = "0123456789abcdef-us7";
pub const LIST_ID: &str = "a1b2c3d4e5";

pub struct TestApp {
    pub addr: String,
    /// Stands in for the MailChimp API
    pub mailchimp_server: MockServer,
    /// Written on activation, like the real server does
    pub record: SettingsRecord,
    pub nonces: NonceIssuer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// A token the server will accept
    pub fn nonce(&self) -> String { self.nonces.create(SUBSCRIBE_ACTION).unwrap() }

    /// A complete, valid submission, as the client script would send it
    pub fn valid_body(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", SUBSCRIBE_ACTION.to_string()),
            ("subscribe-nonce", self.nonce()),
            ("subscribe-email", "ursula_le_guin@gmail.com".to_string()),
            ("subscribe-first-name", "Ursula".to_string()),
            ("subscribe-last-name", "Le Guin".to_string()),
        ]
    }

    async fn post_form<Body>(
        &self,
        path: &str,
        body: &Body,
    ) -> reqwest::Response
    where
        Body: serde::Serialize + ?Sized,
    {
        self.api_client
            .post(format!("{}{path}", self.addr))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(serde_urlencoded::to_string(body).unwrap())
            .send()
            .await
            .expect("execute request")
    }

    /// `POST /ajax`
    pub async fn post_ajax<Body>(
        &self,
        body: &Body,
    ) -> reqwest::Response
    where
        Body: serde::Serialize + ?Sized,
    {
        self.post_form("/ajax", body).await
    }

    /// `POST /ajax`, decoding the JSON body; panics unless the status is 200
    pub async fn subscribe<Body>(
        &self,
        body: &Body,
    ) -> SubscribeResponse
    where
        Body: serde::Serialize + ?Sized,
    {
        let resp = self.post_ajax(body).await;
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }

    /// `POST /`
    pub async fn post_fallback<Body>(
        &self,
        body: &Body,
    ) -> reqwest::Response
    where
        Body: serde::Serialize + ?Sized,
    {
        self.post_form("/", body).await
    }

    pub async fn get(
        &self,
        path: &str,
    ) -> reqwest::Response {
        self.api_client
            .get(format!("{}{path}", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    pub async fn get_html(
        &self,
        path: &str,
    ) -> String {
        self.get(path).await.text().await.unwrap()
    }
}

/// Value of the first `name="..." value="..."` pair for `name`
pub fn input_value(
    html: &str,
    name: &str,
) -> Option<String> {
    let marker = format!(r#"name="{name}" value=""#);
    let start = html.find(&marker)? + marker.len();
    let len = html[start..].find('"')?;
    Some(html[start..start + len].to_owned())
}

pub async fn spawn_app() -> TestApp { spawn_app_with(|_| {}).await }

/// Spawn the server on a random port, with credentials read from a settings
/// record activated in a temp dir, and the provider pointed at a
/// `MockServer`. `customise` runs last, before the server is built.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    // init the tracing subscriber once only
    Lazy::force(&TRACING);

    let mailchimp_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().unwrap();
        // port 0 is reserved by the OS; the server will be spawned on an address with a
        // random available port
        cfg.application.port = 0;
        cfg.application.debug = true;
        cfg.application.settings_record = std::env::temp_dir()
            .join(format!("mailchimp-ajax-api-{}.json", rand::random::<u64>()));
        cfg.mailchimp.api_key = Some(Secret::new(API_KEY.to_string()));
        cfg.mailchimp.list_id = Some(LIST_ID.to_string());
        cfg.mailchimp.source = SettingsSource::Record;
        cfg.mailchimp.base_url = Some(mailchimp_server.uri());
        cfg.mailchimp.timeout_milliseconds = 500;
        customise(&mut cfg);
        cfg
    };

    let record = cfg.settings_record();
    activate(&cfg.mailchimp.constants(), &record).unwrap();

    let nonces = NonceIssuer::new(
        cfg.application.hmac_secret.clone(),
        cfg.form.nonce_lifetime_seconds,
    );

    let app = Application::build(cfg).await.unwrap();
    let addr = format!("http://localhost:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        mailchimp_server,
        record,
        nonces,
        api_client: reqwest::Client::new(),
    }
}
