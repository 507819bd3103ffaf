use std::collections::HashMap;

use actix_web::web;
use actix_web::HttpResponse;

use super::SubscriptionHandler;
use crate::domain::Submission;
use crate::domain::ACTION_FIELD;
use crate::domain::SUBSCRIBE_ACTION;

/// `POST /ajax`
///
/// Dispatches on the `action` field. Every subscribe attempt gets a 200 with a
/// `SubscribeResponse` body, whatever the outcome; an unknown or missing
/// action gets a 400 with body `0`.
///
/// # Request example
///
/// ```sh
///     curl --data 'action=mailchimp_ajax_subscribe&subscribe-nonce=...&subscribe-email=john@foo.com' http://127.0.0.1:8000/ajax
/// ```
#[tracing::instrument(
    name = "Dispatching AJAX action",
    skip_all,
    fields(action = tracing::field::Empty)
)]
pub async fn ajax(
    // any field name may appear (custom fields are configurable), so no struct
    form: web::Form<HashMap<String, String>>,
    handler: web::Data<SubscriptionHandler>,
) -> HttpResponse {
    let submission = Submission::from(form.into_inner());
    let action = submission.get(ACTION_FIELD).unwrap_or_default();
    tracing::Span::current().record("action", action);

    match action {
        SUBSCRIBE_ACTION => HttpResponse::Ok().json(handler.handle(&submission).await),
        _ => {
            tracing::warn!("unknown action");
            HttpResponse::BadRequest().body("0")
        }
    }
}
