use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_PUBLIC_SCHEME: &str = "http";

#[derive(Debug, Clone)]
pub struct Configuration {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub media: MediaConfiguration,
    pub honeycomb: Option<HoneycombConfiguration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaConfiguration {
    pub root: PathBuf,
    /// Always starts and ends with `/`.
    pub url: String,
    pub public_scheme: String,
}

#[derive(Clone)]
pub struct HoneycombConfiguration {
    pub api_key: String,
    pub dataset: String,
}

impl std::fmt::Debug for HoneycombConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoneycombConfiguration")
            .field("dataset", &self.dataset)
            .finish()
    }
}

impl Default for MediaConfiguration {
    fn default() -> Self {
        MediaConfiguration {
            root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            url: DEFAULT_MEDIA_URL.to_owned(),
            public_scheme: DEFAULT_PUBLIC_SCHEME.to_owned(),
        }
    }
}

impl Configuration {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Configuration> {
        dotenv::dotenv().ok();
        Configuration::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Configuration> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_address = lookup("CATALOG_BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("Invalid CATALOG_BIND_ADDRESS {:?}", bind_address))?;

        let public_scheme = lookup("CATALOG_PUBLIC_SCHEME")
            .unwrap_or_else(|| DEFAULT_PUBLIC_SCHEME.to_owned())
            .to_lowercase();
        if public_scheme != "http" && public_scheme != "https" {
            bail!(
                "CATALOG_PUBLIC_SCHEME must be http or https, got {:?}",
                public_scheme
            );
        }
        let media = MediaConfiguration {
            root: lookup("CATALOG_MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT)),
            url: normalize_media_url(
                &lookup("CATALOG_MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.to_owned()),
            )?,
            public_scheme,
        };

        let honeycomb = match (lookup("HONEYCOMB_API_KEY"), lookup("HONEYCOMB_DATASET")) {
            (Some(api_key), Some(dataset)) => Some(HoneycombConfiguration { api_key, dataset }),
            (Some(_), None) => bail!("HONEYCOMB_DATASET must be set alongside HONEYCOMB_API_KEY"),
            _ => None,
        };

        Ok(Configuration {
            database_url,
            bind_address,
            media,
            honeycomb,
        })
    }
}

fn normalize_media_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        bail!("CATALOG_MEDIA_URL must name at least one path segment");
    }
    if trimmed.contains("://") || trimmed.contains('?') || trimmed.contains('#') {
        bail!("CATALOG_MEDIA_URL must be a plain path, got {:?}", raw);
    }
    Ok(format!("/{}/", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Configuration> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Configuration::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/catalog")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.media, MediaConfiguration::default());
        assert!(config.honeycomb.is_none());
    }

    #[test]
    fn database_url_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn media_url_gains_slashes() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_MEDIA_URL", "static/uploads"),
        ])
        .unwrap();
        assert_eq!(config.media.url, "/static/uploads/");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_BIND_ADDRESS", "not an address"),
        ])
        .is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_MEDIA_URL", "/"),
        ])
        .is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_PUBLIC_SCHEME", "ftp"),
        ])
        .is_err());
        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("HONEYCOMB_API_KEY", "key"),
        ])
        .is_err());
    }
}
