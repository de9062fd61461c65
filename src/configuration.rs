use anyhow::Context;
use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// 환경 변수에서 읽어 온 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub slack_webhook_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL 환경 변수가 필요합니다")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET 환경 변수가 필요합니다")?;

        let port = match lookup("APP_PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("APP_PORT 값이 올바르지 않습니다: {}", port))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            host: lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            slack_webhook_url: lookup("SLACK_WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Settings;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_applied() {
        let settings = settings(&[("DATABASE_URL", "mysql://localhost/tracker"), ("JWT_SECRET", "secret")]).unwrap();

        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8080);
        assert!(settings.slack_webhook_url.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(settings(&[("JWT_SECRET", "secret")]).is_err());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = settings(&[
            ("DATABASE_URL", "mysql://localhost/tracker"),
            ("JWT_SECRET", "secret"),
            ("APP_PORT", "eighty"),
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn blank_slack_webhook_is_ignored() {
        let settings = settings(&[
            ("DATABASE_URL", "mysql://localhost/tracker"),
            ("JWT_SECRET", "secret"),
            ("SLACK_WEBHOOK_URL", " "),
        ])
        .unwrap();

        assert!(settings.slack_webhook_url.is_none());
    }
}
