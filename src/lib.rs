pub mod configuration;
pub mod domain;
pub mod error_policy;
pub mod form;
pub mod lifecycle;
pub mod mailchimp_client;
pub mod nonce;
pub mod routes;
pub mod settings;
pub mod startup;
pub mod telemetry;
pub mod utils;
