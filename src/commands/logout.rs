//! Forgets cached session tokens and stored secrets.

use crate::api::toggl;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::secret::SecretStore;
use crate::{msg_success, msg_warning};
use anyhow::Result;

pub fn cmd(config: &Config) -> Result<()> {
    let secrets = config.sync().secret_backend.open()?;
    logout(config, secrets.as_ref())
}

/// Removes the secrets of every configured service and clears the session
/// tokens from the configuration file.
pub fn logout(config: &Config, secrets: &dyn SecretStore) -> Result<()> {
    let mut accounts = vec![("Toggl", toggl::SECRET_SITE.to_string(), toggl::SECRET_LOGIN.to_string())];
    if let Some(shotgun) = &config.shotgun {
        accounts.push(("Shotgun", shotgun.site.clone(), shotgun.login.clone()));
    }
    if let Some(jira) = &config.jira {
        accounts.push(("JIRA", jira.api_url.clone(), jira.login.clone()));
    }

    for (service, site, login) in &accounts {
        match secrets.delete(site, login) {
            Ok(()) => msg_success!(Message::LoggedOut(service.to_string())),
            Err(err) => msg_warning!(Message::SecretStoreUnavailable(err.to_string())),
        }
    }

    let mut config = config.clone();
    if let Some(shotgun) = config.shotgun.as_mut() {
        shotgun.session_token = None;
    }
    if let Some(jira) = config.jira.as_mut() {
        jira.session_token = None;
    }
    config.save()
}
