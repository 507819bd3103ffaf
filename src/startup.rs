use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::error_policy::ErrorPolicy;
use crate::form::FormRenderer;
use crate::mailchimp_client::MailchimpClient;
use crate::nonce::NonceIssuer;
use crate::routes::ajax;
use crate::routes::client_script;
use crate::routes::fallback;
use crate::routes::form;
use crate::routes::health_check;
use crate::routes::home;
use crate::routes::SubscriptionHandler;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Wrapper over `startup::run` that builds a `Server`
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        // env-dependent host
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // get the randomised port assigned by OS (when port is 0)
        let port = listener.local_addr()?.port();

        let mailchimp_client =
            MailchimpClient::new(cfg.mailchimp.base_url.clone(), cfg.mailchimp.timeout())?;
        let nonces = NonceIssuer::new(
            cfg.application.hmac_secret.clone(),
            cfg.form.nonce_lifetime_seconds,
        );
        let renderer = FormRenderer::new(&cfg.form, nonces.clone());
        let handler = SubscriptionHandler::new(
            nonces,
            ErrorPolicy::from_debug_flag(cfg.application.debug),
            cfg.form.custom_fields.clone(),
            cfg.settings_provider(),
            Arc::new(mailchimp_client),
        );

        let server = run(listener, handler, renderer)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    handler: SubscriptionHandler,
    renderer: FormRenderer,
) -> Result<Server, anyhow::Error> {
    // `Data` is externally an `Arc` (for sharing/cloning)
    let handler = Data::new(handler);
    let renderer = Data::new(renderer);

    // one copy of `App` per worker, hence the clones
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/", web::post().to(fallback))
            .route("/form", web::get().to(form))
            .route("/ajax", web::post().to(ajax))
            .route("/health_check", web::get().to(health_check))
            .route("/static/mailchimp-ajax.js", web::get().to(client_script))
            .app_data(handler.clone())
            .app_data(renderer.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
