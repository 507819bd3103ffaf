use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::MergeVars;
use crate::domain::SubscriberEmail;
use crate::utils::error_chain_fmt;

/// Which list to subscribe to, and with which account
pub struct ListTarget {
    pub api_key: Secret<String>,
    pub list_id: String,
}

#[derive(thiserror::Error)]
pub enum ProviderError {
    /// The provider answered, and said no. The message is the provider's own
    /// and is shown to the visitor verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for ProviderError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The one operation needed from a mailing-list provider. The handler only
/// ever sees this trait, so tests can substitute a fake.
#[async_trait]
pub trait MailingList: Send + Sync {
    async fn subscribe(
        &self,
        target: &ListTarget,
        email: &SubscriberEmail,
        merge_vars: &MergeVars,
    ) -> Result<(), ProviderError>;
}

/// Client for the MailChimp 2.0 API (`lists/subscribe`).
///
/// The `reqwest::Client` holds a connection pool, so a single
/// `MailchimpClient` should be built at startup and shared.
pub struct MailchimpClient {
    http_client: Client,
    /// When unset, the url is derived from the datacenter suffix of the API key
    base_url: Option<String>,
}

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    apikey: &'a str,
    id: &'a str,
    email: EmailStruct<'a>,
    #[serde(skip_serializing_if = "no_merge_vars")]
    merge_vars: &'a MergeVars,
}

fn no_merge_vars(merge_vars: &&MergeVars) -> bool { merge_vars.is_empty() }

#[derive(Serialize)]
struct EmailStruct<'a> {
    email: &'a str,
}

/// Error body, e.g.
///
/// ```json
/// {"status": "error", "code": 200, "name": "List_DoesNotExist", "error": "Invalid MailChimp List ID: foo"}
/// ```
#[derive(Deserialize)]
struct ApiError {
    name: Option<String>,
    error: String,
}

impl MailchimpClient {
    pub fn new(
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(
        &self,
        api_key: &str,
    ) -> String {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("https://{}.api.mailchimp.com/2.0", datacenter(api_key)),
        };
        format!("{base}/lists/subscribe.json")
    }
}

/// `0123456789abcdef-us7` -> `us7`. Keys without a suffix live in `us1`.
fn datacenter(api_key: &str) -> &str {
    match api_key.split_once('-') {
        Some((_, dc)) if !dc.is_empty() => dc,
        _ => "us1",
    }
}

#[async_trait]
impl MailingList for MailchimpClient {
    #[tracing::instrument(
        name = "Subscribing to mailing list",
        skip(self, target, email, merge_vars),
        fields(list_id = %target.list_id, subscriber_email = %email)
    )]
    async fn subscribe(
        &self,
        target: &ListTarget,
        email: &SubscriberEmail,
        merge_vars: &MergeVars,
    ) -> Result<(), ProviderError> {
        let api_key = target.api_key.expose_secret();
        if api_key.is_empty() {
            return Err(ProviderError::Rejected(
                "You must provide a MailChimp API key".to_string(),
            ));
        }

        let body = SubscribeRequest {
            apikey: api_key,
            id: &target.list_id,
            email: EmailStruct {
                email: email.as_ref(),
            },
            merge_vars,
        };

        let resp = self
            .http_client
            .post(self.endpoint(api_key))
            .json(&body)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        // the API reports every failure (bad key, unknown list, already
        // subscribed, ...) as a non-2xx status with a JSON body
        let status = resp.status();
        match resp.json::<ApiError>().await {
            Ok(e) => {
                tracing::warn!(error.name = ?e.name, error.message = %e.error, "subscription rejected");
                Err(ProviderError::Rejected(e.error))
            }
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, %status, "unreadable error response");
                Err(ProviderError::Rejected(format!(
                    "MailChimp API request failed with status {status}"
                )))
            }
        }
    }
}
