//! Provider settings resolution
//!
//! Each setting comes from the first non-empty source: command-line flag,
//! the `[provider]` block of the declaration file, then the environment.

use declarative::{Diagnostics, OpResult};
use serde::Deserialize;
use unleash_client::{Client, Error};

const URL_VARS: &[&str] = &["UNLEASH_URL"];
const TOKEN_VARS: &[&str] = &["AUTH_TOKEN", "UNLEASH_AUTH_TOKEN"];

/// The `[provider]` block of a declaration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderBlock {
    pub base_url: Option<String>,
    pub authorization: Option<String>,
}

/// Fully resolved provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Server URL without trailing slash
    pub base_url: String,
    pub authorization: String,
}

impl ProviderConfig {
    /// Resolve settings from flags, file and the process environment
    pub fn resolve(flags: &ProviderBlock, file: &ProviderBlock) -> OpResult<Self> {
        Self::resolve_with(flags, file, |name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup
    ///
    /// Both settings are checked before failing so every missing one is
    /// reported at once.
    pub fn resolve_with(
        flags: &ProviderBlock,
        file: &ProviderBlock,
        env: impl Fn(&str) -> Option<String>,
    ) -> OpResult<Self> {
        let base_url = pick(
            &[flags.base_url.as_deref(), file.base_url.as_deref()],
            URL_VARS,
            &env,
        );
        let authorization = pick(
            &[flags.authorization.as_deref(), file.authorization.as_deref()],
            TOKEN_VARS,
            &env,
        );

        let mut diags = Diagnostics::new();
        if base_url.is_none() {
            diags.push(missing("base_url", "--base-url", URL_VARS).into());
        }
        if authorization.is_none() {
            diags.push(missing("authorization", "--authorization", TOKEN_VARS).into());
        }

        match (base_url, authorization) {
            (Some(base_url), Some(authorization)) => Ok(Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                authorization,
            }),
            _ => Err(diags),
        }
    }

    pub fn client(&self) -> Client {
        log::debug!("Using Unleash server at {}", self.base_url);
        Client::http(&self.base_url, self.authorization.clone())
    }
}

fn pick(
    explicit: &[Option<&str>],
    vars: &[&str],
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    explicit
        .iter()
        .flatten()
        .map(|value| (*value).to_string())
        .chain(vars.iter().filter_map(|var| env(*var)))
        .find(|value| !value.trim().is_empty())
}

fn missing(setting: &str, flag: &str, vars: &[&str]) -> Error {
    Error::Configuration {
        setting: setting.to_string(),
        message: format!(
            "Looked for {flag}, '{setting}' in the [provider] block and the environment variables {}",
            vars.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn block(base_url: Option<&str>, authorization: Option<&str>) -> ProviderBlock {
        ProviderBlock {
            base_url: base_url.map(str::to_string),
            authorization: authorization.map(str::to_string),
        }
    }

    #[test]
    fn test_flag_beats_file_beats_env() {
        let flags = block(Some("http://flag:4242/"), None);
        let file = block(Some("http://file:4242"), Some("file-token"));
        let config = ProviderConfig::resolve_with(
            &flags,
            &file,
            env(&[("UNLEASH_URL", "http://env:4242"), ("AUTH_TOKEN", "env-token")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://flag:4242");
        assert_eq!(config.authorization, "file-token");
    }

    #[test]
    fn test_env_fallback_order() {
        let config = ProviderConfig::resolve_with(
            &ProviderBlock::default(),
            &block(Some(""), None),
            env(&[
                ("UNLEASH_URL", "http://localhost:4242"),
                ("AUTH_TOKEN", "  "),
                ("UNLEASH_AUTH_TOKEN", "*:*.secret"),
            ]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:4242");
        assert_eq!(config.authorization, "*:*.secret");
    }

    #[test]
    fn test_reports_every_missing_setting() {
        let err = ProviderConfig::resolve_with(
            &ProviderBlock::default(),
            &ProviderBlock::default(),
            env(&[]),
        )
        .unwrap_err();
        let summaries: Vec<&str> = err.errors().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["Unable to find base_url", "Unable to find authorization"]
        );
        assert!(err.errors().next().unwrap().detail.contains("UNLEASH_URL"));
    }
}
