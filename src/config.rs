//! Connection settings for the Dynamics metadata API.
//!
//! Every value is looked up in the environment first (a `.env` file in the
//! working directory is loaded beforehand) and prompted for interactively when
//! missing or blank.

use anyhow::Result;
use log::debug;
use std::fmt;

use crate::ui::prompts::Prompter;

pub const URL_VAR: &str = "CRM_URL";
pub const USER_VAR: &str = "CRM_USER";
pub const PASSWORD_VAR: &str = "CRM_PASS";

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Env,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSources {
    pub base_url: ValueSource,
    pub username: ValueSource,
    pub password: ValueSource,
}

/// NTLM connection parameters for one run
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Service root without trailing slash, e.g. `http://192.168.1.6/gostaresh`
    pub base_url: String,
    /// Empty when the account was given without a `DOMAIN\` prefix
    pub domain: String,
    pub username: String,
    pub password: String,
    pub sources: ConnectionSources,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sources", &self.sources)
            .finish()
    }
}

impl ConnectionConfig {
    /// Resolve from the process environment, falling back to `prompter`
    pub fn resolve(prompter: &dyn Prompter) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::resolve_with(|name| std::env::var(name).ok(), prompter)
    }

    /// Resolve with an explicit variable lookup
    pub fn resolve_with<F>(lookup: F, prompter: &dyn Prompter) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (base_url, url_source) = resolve_value(&lookup, URL_VAR, || {
            prompter.input("CRM base URL (e.g. http://192.168.1.6)")
        })?;
        let (account, user_source) =
            resolve_value(&lookup, USER_VAR, || prompter.input("DOMAIN\\user"))?;
        let (password, password_source) =
            resolve_value(&lookup, PASSWORD_VAR, || prompter.password("Password"))?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("CRM base URL must not be empty");
        }

        let (domain, username) = split_account(account.trim());
        debug!(
            "Resolved connection to {} as '{}' (domain '{}')",
            base_url, username, domain
        );

        Ok(Self {
            base_url,
            domain,
            username,
            password,
            sources: ConnectionSources {
                base_url: url_source,
                username: user_source,
                password: password_source,
            },
        })
    }
}

fn resolve_value<F, P>(lookup: &F, var: &str, prompt: P) -> Result<(String, ValueSource)>
where
    F: Fn(&str) -> Option<String>,
    P: FnOnce() -> Result<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok((value, ValueSource::Env)),
        _ => Ok((prompt()?, ValueSource::Prompt)),
    }
}

/// Split `DOMAIN\user` on the first backslash
pub fn split_account(account: &str) -> (String, String) {
    match account.split_once('\\') {
        Some((domain, user)) => (domain.to_string(), user.to_string()),
        None => (String::new(), account.to_string()),
    }
}
