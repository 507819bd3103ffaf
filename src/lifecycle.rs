//! Activation and deactivation.
//!
//! inactive --(constants present)--> active, settings record persisted
//! inactive --(constants missing)--> activation refused, server not started
//!
//! Deactivation (server shutdown) removes the record again.

use crate::settings::ListSettings;
use crate::settings::SettingsError;
use crate::settings::SettingsRecord;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum ActivationError {
    #[error(
        "Failed to activate MailChimp AJAX. mailchimp.list_id and mailchimp.api_key must be defined."
    )]
    MissingConstants,
    #[error("Failed to activate MailChimp AJAX. The settings record could not be written.")]
    Persist(#[from] SettingsError),
}

impl std::fmt::Debug for ActivationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[tracing::instrument(name = "Activating", skip_all)]
pub fn activate(
    constants: &ListSettings,
    record: &SettingsRecord,
) -> Result<(), ActivationError> {
    if !constants.is_complete() {
        return Err(ActivationError::MissingConstants);
    }
    record.save(constants)?;
    tracing::info!("activated");
    Ok(())
}

#[tracing::instrument(name = "Deactivating", skip_all)]
pub fn deactivate(record: &SettingsRecord) -> Result<(), SettingsError> {
    record.remove()?;
    tracing::info!("deactivated");
    Ok(())
}
