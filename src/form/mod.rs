//! Server-side rendering of the subscription form.

mod kses;
mod state;

use std::fmt::Debug;
use std::path::PathBuf;

use htmlescape::encode_minimal;
pub use kses::form_allow_list;
pub use kses::AllowList;
pub use state::FormState;
use tera::Context;
use tera::Tera;

use crate::configuration::FormLabels;
use crate::configuration::FormSettings;
use crate::domain::CustomField;
use crate::domain::EMAIL_FIELD;
use crate::domain::SUBSCRIBE_ACTION;
use crate::nonce::NonceIssuer;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum RenderError {
    #[error("could not read form template {}", .path.display())]
    MissingTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not render form template")]
    Template(#[from] tera::Error),
    #[error("could not issue form token")]
    Nonce(#[source] anyhow::Error),
}

impl Debug for RenderError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Fills the template file with labels, a fresh token and the custom field
/// markup, then passes the result through the allow-list filter.
///
/// The template is read from disk on every render, so it can be edited
/// without a restart. Placeholders, in the order they appear in the default
/// template: `form_id`, `custom_fields`, `email_field`, `nonce`,
/// `subscribe_button`, `error_msg`, `success_msg`; plus `action`, `state` and
/// `errors`.
pub struct FormRenderer {
    template_file: PathBuf,
    form_id: String,
    labels: FormLabels,
    fields: Vec<CustomField>,
    nonces: NonceIssuer,
}

impl FormRenderer {
    pub fn new(
        settings: &FormSettings,
        nonces: NonceIssuer,
    ) -> Self {
        Self {
            template_file: settings.template_file.clone(),
            form_id: settings.form_id.clone(),
            labels: settings.labels.clone(),
            fields: settings.custom_fields.clone(),
            nonces,
        }
    }

    #[tracing::instrument(
        name = "Rendering subscription form",
        skip_all,
        fields(state = state.name(), template = %self.template_file.display())
    )]
    pub fn render(
        &self,
        state: &FormState,
    ) -> Result<String, RenderError> {
        let template = std::fs::read_to_string(&self.template_file).map_err(|source| {
            RenderError::MissingTemplate {
                path: self.template_file.clone(),
                source,
            }
        })?;
        let nonce = self
            .nonces
            .create(SUBSCRIBE_ACTION)
            .map_err(RenderError::Nonce)?;

        let mut ctx = Context::new();
        ctx.insert("form_id", &self.form_id);
        ctx.insert("custom_fields", &self.custom_fields_html());
        ctx.insert("email_field", &self.email_field_html());
        ctx.insert("nonce", &nonce);
        ctx.insert("subscribe_button", &self.subscribe_button_html());
        ctx.insert("error_msg", &self.labels.try_again);
        ctx.insert("success_msg", &self.labels.success);
        ctx.insert("action", SUBSCRIBE_ACTION);
        ctx.insert("state", state.name());
        ctx.insert("errors", state.errors());

        let html = Tera::one_off(&template, &ctx, true)?;
        Ok(form_allow_list().sanitize(&html))
    }

    fn custom_fields_html(&self) -> String { self.fields.iter().map(CustomField::html).collect() }

    fn email_field_html(&self) -> String {
        format!(
            r#"<input class="email-field" name="{EMAIL_FIELD}" type="email" placeholder="{}" />"#,
            encode_minimal(&self.labels.email_placeholder)
        )
    }

    fn subscribe_button_html(&self) -> String {
        format!(
            r#"<input type="submit" value="{}" />"#,
            encode_minimal(&self.labels.subscribe_button)
        )
    }
}
