use std::sync::Arc;

use crate::domain::CustomField;
use crate::domain::MergeVars;
use crate::domain::Sanitizer;
use crate::domain::Submission;
use crate::domain::SubscribeResponse;
use crate::domain::SubscriberEmail;
use crate::domain::EMAIL_FIELD;
use crate::domain::NONCE_FIELD;
use crate::domain::SUBSCRIBE_ACTION;
use crate::error_policy::ErrorPolicy;
use crate::mailchimp_client::ListTarget;
use crate::mailchimp_client::MailingList;
use crate::mailchimp_client::ProviderError;
use crate::nonce::NonceIssuer;
use crate::settings::SettingsProvider;

pub const MISSING_EMAIL: &str = "Missing Email field";
pub const INVALID_EMAIL: &str = "Invalid Email address";

/// One independent check on a submission, reporting at most one error. All
/// validators run; their errors are concatenated in order.
enum Validator<'a> {
    Required(&'a CustomField),
    /// "missing" and "invalid" are mutually exclusive: validity is only checked
    /// for a non-empty value
    Email,
}

impl Validator<'_> {
    fn check(
        &self,
        submission: &Submission,
    ) -> Option<String> {
        match self {
            Validator::Required(field) => submission
                .non_empty(&field.name)
                .is_none()
                .then(|| field.missing_message()),
            Validator::Email => match submission.non_empty(EMAIL_FIELD) {
                None => Some(MISSING_EMAIL.to_string()),
                Some(raw) => parse_email(raw).err().map(|_| INVALID_EMAIL.to_string()),
            },
        }
    }
}

/// The address to subscribe, provided sanitizing leaves the (trimmed) input
/// exactly as typed. Anything the sanitizer would have to change is rejected
/// rather than silently subscribing a different address.
fn parse_email(raw: &str) -> Result<SubscriberEmail, String> {
    let trimmed = raw.trim();
    let sanitized = Sanitizer::Email.apply(trimmed);
    if sanitized != trimmed {
        return Err(format!("{trimmed:?} is not a plain ascii address"));
    }
    SubscriberEmail::parse(sanitized)
}

/// validate -> resolve credentials -> call the provider -> respond.
///
/// Every failure ends up as a `SubscribeResponse` with `success: false`; this
/// never returns an `Err`, and never calls the provider unless every check
/// passed.
pub struct SubscriptionHandler {
    nonces: NonceIssuer,
    policy: ErrorPolicy,
    fields: Vec<CustomField>,
    settings: Arc<dyn SettingsProvider>,
    mailing_list: Arc<dyn MailingList>,
}

impl SubscriptionHandler {
    pub fn new(
        nonces: NonceIssuer,
        policy: ErrorPolicy,
        fields: Vec<CustomField>,
        settings: Arc<dyn SettingsProvider>,
        mailing_list: Arc<dyn MailingList>,
    ) -> Self {
        Self {
            nonces,
            policy,
            fields,
            settings,
            mailing_list,
        }
    }

    fn validators(&self) -> Vec<Validator<'_>> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(Validator::Required)
            .chain([Validator::Email])
            .collect()
    }

    /// One error per missing credential, detail subject to the error policy
    fn resolve_target(&self) -> Result<ListTarget, Vec<String>> {
        let settings = match self.settings.load() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, error.message = %e, "could not load settings");
                return Err(vec![self.policy.reveal(&e.to_string())]);
            }
        };

        let mut errors = vec![];
        if settings.api_key().is_none() {
            errors.push(self.policy.reveal("mailchimp.api_key is not defined"));
        }
        if settings.list_id().is_none() {
            errors.push(self.policy.reveal("mailchimp.list_id is not defined"));
        }

        match (settings.api_key(), settings.list_id()) {
            (Some(api_key), Some(list_id)) => Ok(ListTarget {
                api_key: api_key.clone(),
                list_id: list_id.to_owned(),
            }),
            _ => Err(errors),
        }
    }

    /// Custom field values, sanitized, keyed by merge tag. Empty values are
    /// left out rather than sent as blanks.
    fn merge_vars(
        &self,
        submission: &Submission,
    ) -> MergeVars {
        let mut merge_vars = MergeVars::default();
        for field in &self.fields {
            let Some(raw) = submission.get(&field.name) else {
                continue;
            };
            let value = field.sanitizer.apply(raw);
            if !value.is_empty() {
                merge_vars.insert(&field.merge_tag, value);
            }
        }
        merge_vars
    }

    #[tracing::instrument(
        name = "Handling subscription",
        skip_all,
        fields(subscriber_email = tracing::field::Empty)
    )]
    pub async fn handle(
        &self,
        submission: &Submission,
    ) -> SubscribeResponse {
        // a bad token ends the request on its own, before anything else is looked at
        let token_ok = submission
            .get(NONCE_FIELD)
            .and_then(|nonce| self.nonces.verify(SUBSCRIBE_ACTION, nonce))
            .is_some();
        if !token_ok {
            tracing::warn!("nonce was not verified");
            return failure(vec![self.policy.reveal("Nonce was not verified")]);
        }

        let mut errors: Vec<String> = self
            .validators()
            .iter()
            .filter_map(|v| v.check(submission))
            .collect();

        let target = self.resolve_target().map_err(|e| errors.extend(e)).ok();

        let (Some(target), true) = (target, errors.is_empty()) else {
            tracing::info!(?errors, "submission rejected");
            return failure(errors);
        };

        // already checked by the email validator
        let Ok(email) = parse_email(submission.get(EMAIL_FIELD).unwrap_or_default()) else {
            return failure(vec![INVALID_EMAIL.to_string()]);
        };
        tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

        let merge_vars = self.merge_vars(submission);
        match self
            .mailing_list
            .subscribe(&target, &email, &merge_vars)
            .await
        {
            Ok(()) => {
                tracing::info!("subscribed");
                SubscribeResponse::success()
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, error.message = %e, "provider call failed");
                let message = match e {
                    // the provider's own words, meant for the visitor
                    ProviderError::Rejected(message) => message,
                    ProviderError::Transport(e) => self.policy.reveal(&e.without_url().to_string()),
                };
                failure(vec![message])
            }
        }
    }
}

/// A rejection always stays a rejection, even with nothing to say
fn failure(errors: Vec<String>) -> SubscribeResponse {
    SubscribeResponse::failure(errors).unwrap_or_else(SubscribeResponse::internal_error)
}
