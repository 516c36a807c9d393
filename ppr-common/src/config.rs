// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use figment::{Figment, Error, providers::{Format, Json, Toml, Yaml, Env, Serialized}};

use crate::constant::ENV_PREFIX;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
#[derive(Default)]
pub struct AppConfig {
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub guest: GuestConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}


#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct HooksConfig {
    /// Host namespace probed for operator provided resources. Empty means the
    /// namespace of the host client.
    #[serde(default)]
    pub target_namespace: String,
    /// Suffix the synchronizer appends to translated names, usually the name of
    /// the virtual cluster.
    #[serde(default)]
    pub suffix: String,
    /// Deadline for a whole admission pass. Zero disables the deadline.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl HooksConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        HooksConfig {
            target_namespace: String::new(),
            suffix: "vcluster".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct GuestConfig {
    /// Kubeconfig of the virtual cluster. Empty means infer from the environment.
    #[serde(default)]
    pub kubeconfig: String,
}

impl Default for GuestConfig {
    fn default() -> Self {
        GuestConfig {
            kubeconfig: "/data/vcluster/kubeconfig.yaml".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct WebhookConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tls: TLSConfig,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            host: "0.0.0.0".to_string(),
            port: 8443,
            tls: TLSConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct TLSConfig {
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
}

impl Default for TLSConfig {
    fn default() -> Self {
        TLSConfig {
            cert_file: "/etc/ssl/certs/tls.crt".to_string(),
            key_file: "/etc/ssl/certs/tls.key".to_string(),
        }
    }
}

pub struct AppConfigBuilder {
    figment: Figment,
}

impl AppConfigBuilder {
    pub fn with_file(&mut self, path: &str) -> &mut Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        self.figment = match extension {
            "json" => self.figment.clone().merge(Json::file(path)),
            "yaml" | "yml" => self.figment.clone().merge(Yaml::file(path)),
            "toml" => self.figment.clone().merge(Toml::file(path)),
            _ => self.figment.clone(),
        };
        self
    }

    pub fn with_env(&mut self) -> &mut Self {
        self.figment = self.figment.clone().merge(Env::prefixed(&format!("{}__", ENV_PREFIX)).split("__"));
        self
    }

    pub fn with_override_option(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.figment = self.figment.clone().merge(Serialized::default(key, value));
        }
        self
    }

    pub fn build(&self) -> Result<AppConfig, Error> {
        self.figment.extract()
    }
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        AppConfigBuilder {
            figment: Figment::from(Serialized::defaults(AppConfig::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_usable() {
        let config = AppConfigBuilder::default().build().unwrap();

        assert_eq!(config.hooks.suffix, "vcluster");
        assert!(config.hooks.target_namespace.is_empty());
        assert_eq!(config.hooks.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.webhook.port, 8443);
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("PPR__HOOKS__TARGET_NAMESPACE", "vcluster-team-a");
            jail.set_env("PPR__HOOKS__SUFFIX", "team-a");
            jail.set_env("PPR__WEBHOOK__PORT", "9443");

            let config = AppConfigBuilder::default().with_env().build()?;

            assert_eq!(config.hooks.target_namespace, "vcluster-team-a");
            assert_eq!(config.hooks.suffix, "team-a");
            assert_eq!(config.webhook.port, 9443);
            assert_eq!(config.webhook.host, "0.0.0.0");
            Ok(())
        });
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", r#"
hooks:
  suffix: from-file
  request_timeout_secs: 3
guest:
  kubeconfig: ""
"#)?;
            jail.set_env("PPR__HOOKS__SUFFIX", "from-env");

            let config = AppConfigBuilder::default()
                .with_file("config.yaml")
                .with_env()
                .build()?;

            assert_eq!(config.hooks.suffix, "from-env");
            assert_eq!(config.hooks.request_timeout_secs, 3);
            assert!(config.guest.kubeconfig.is_empty());
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        Jail::expect_with(|jail| {
            jail.set_env("PPR__HOOKS__REQUEST_TIMEOUT_SECS", "0");

            let config = AppConfigBuilder::default().with_env().build()?;

            assert_eq!(config.hooks.request_timeout(), None);
            Ok(())
        });
    }

    #[test]
    fn override_option_wins() {
        let config = AppConfigBuilder::default()
            .with_override_option("hooks.target_namespace", Some("host-ns"))
            .with_override_option("hooks.suffix", None)
            .build()
            .unwrap();

        assert_eq!(config.hooks.target_namespace, "host-ns");
        assert_eq!(config.hooks.suffix, "vcluster");
    }
}
