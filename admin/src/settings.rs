//! User admin configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration values rejected after loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("base URL `{value}` is invalid: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL `{value}` must use http or https")]
    UnsupportedScheme { value: String },
    #[error("page limit must be positive")]
    ZeroPageLimit,
    #[error("request timeout must be positive")]
    ZeroTimeout,
}

/// Configuration values controlling how the client reaches the user service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_ADMIN")]
pub struct AdminSettings {
    /// Root URL of the user service; `/users` is appended.
    pub base_url: Option<String>,
    /// Records per page when the command line does not say otherwise.
    pub page_limit: Option<u32>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Refetch the current page after every successful save.
    #[ortho_config(default = false)]
    pub refetch_after_save: bool,
}

impl AdminSettings {
    /// Return the configured base URL, falling back to the public DummyJSON host.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not an http(s) URL.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let value = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = Url::parse(value).map_err(|source| SettingsError::InvalidBaseUrl {
            value: value.to_owned(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(SettingsError::UnsupportedScheme {
                value: value.to_owned(),
            }),
        }
    }

    /// Return the configured page limit, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroPageLimit`] for a limit of zero.
    pub fn page_limit(&self) -> Result<u32, SettingsError> {
        match self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT) {
            0 => Err(SettingsError::ZeroPageLimit),
            limit => Ok(limit),
        }
    }

    /// Return the configured request timeout, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a timeout of zero.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for admin configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 4] = [
        "USER_ADMIN_BASE_URL",
        "USER_ADMIN_PAGE_LIMIT",
        "USER_ADMIN_REQUEST_TIMEOUT_SECS",
        "USER_ADMIN_REFETCH_AFTER_SAVE",
    ];

    fn load_from_empty_args() -> AdminSettings {
        AdminSettings::load_from_iter([OsString::from("user-admin")]).expect("config should load")
    }

    fn settings(base_url: Option<&str>, page_limit: Option<u32>) -> AdminSettings {
        AdminSettings {
            base_url: base_url.map(str::to_owned),
            page_limit,
            request_timeout_secs: None,
            refetch_after_save: false,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("default URL").as_str(),
            "https://dummyjson.com/"
        );
        assert_eq!(settings.page_limit(), Ok(DEFAULT_PAGE_LIMIT));
        assert_eq!(settings.request_timeout(), Ok(Duration::from_secs(30)));
        assert!(!settings.refetch_after_save);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_ADMIN_BASE_URL", Some("http://127.0.0.1:8080/api".to_owned())),
            ("USER_ADMIN_PAGE_LIMIT", Some("25".to_owned())),
            ("USER_ADMIN_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("USER_ADMIN_REFETCH_AFTER_SAVE", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("configured URL").as_str(),
            "http://127.0.0.1:8080/api"
        );
        assert_eq!(settings.page_limit(), Ok(25));
        assert_eq!(settings.request_timeout(), Ok(Duration::from_secs(5)));
        assert!(settings.refetch_after_save);
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://files.example.com")]
    fn rejects_unusable_base_urls(#[case] value: &str) {
        assert!(settings(Some(value), None).base_url().is_err());
    }

    #[rstest]
    fn rejects_a_zero_page_limit() {
        assert_eq!(
            settings(None, Some(0)).page_limit(),
            Err(SettingsError::ZeroPageLimit)
        );
    }
}
