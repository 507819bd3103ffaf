use std::collections::HashMap;

use actix_web::http::header::ContentType;
use actix_web::web;
use actix_web::HttpResponse;

use super::SubscriptionHandler;
use crate::domain::Submission;
use crate::domain::ACTION_FIELD;
use crate::domain::SUBSCRIBE_ACTION;
use crate::form::FormRenderer;
use crate::form::FormState;
use crate::utils::error_500;

/// Wrap the rendered form in the page shell
fn page(
    renderer: &FormRenderer,
    state: &FormState,
) -> Result<HttpResponse, actix_web::Error> {
    let form = renderer.render(state).map_err(error_500)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        // path relative to this file (checked at compile time!)
        .body(include_str!("./home.html").replace("{form}", &form)))
}

/// `GET /`
pub async fn home(renderer: web::Data<FormRenderer>) -> Result<HttpResponse, actix_web::Error> {
    page(&renderer, &FormState::Idle)
}

/// `GET /form`
///
/// Just the form, for embedding in another page
pub async fn form(renderer: web::Data<FormRenderer>) -> Result<HttpResponse, actix_web::Error> {
    let form = renderer.render(&FormState::Idle).map_err(error_500)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(form))
}

/// `POST /`
///
/// Where the form ends up when the client script did not run. Goes through
/// the same handler as `/ajax`, then renders the page with the outcome
/// already applied.
#[tracing::instrument(name = "Handling fallback submission", skip_all)]
pub async fn fallback(
    form: web::Form<HashMap<String, String>>,
    handler: web::Data<SubscriptionHandler>,
    renderer: web::Data<FormRenderer>,
) -> Result<HttpResponse, actix_web::Error> {
    let submission = Submission::from(form.into_inner());
    let state = match submission.get(ACTION_FIELD) {
        Some(SUBSCRIBE_ACTION) => FormState::from(handler.handle(&submission).await),
        _ => FormState::Idle,
    };
    page(&renderer, &state)
}
