pub mod example;
pub mod slack;

use std::sync::Arc;

use tracing::info;

use crate::configuration::Settings;
use crate::partner::backend::PartnerBackend;
use crate::partner::error::PartnerError;
use crate::partner::registry::PartnerRegistry;

pub use example::ExampleBackend;
pub use slack::SlackBackend;

/// 애플리케이션에 포함된 파트너 백엔드를 등록한다.
pub fn register_builtin_backends(registry: &mut PartnerRegistry, settings: &Settings) -> Result<(), PartnerError> {
    registry.register_builtin(example::CODE, || Arc::new(ExampleBackend) as Arc<dyn PartnerBackend>)?;

    if let Some(webhook_url) = settings.slack_webhook_url.clone() {
        registry.register_builtin(slack::CODE, move || Arc::new(SlackBackend::new(webhook_url.clone())) as Arc<dyn PartnerBackend>)?;
        info!("Slack 파트너 백엔드 등록");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(slack_webhook_url: Option<&str>) -> Settings {
        Settings {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            slack_webhook_url: slack_webhook_url.map(str::to_string),
        }
    }

    #[test]
    fn slack_is_registered_only_with_webhook() {
        let mut without = PartnerRegistry::new();
        register_builtin_backends(&mut without, &settings(None)).unwrap();

        let mut with = PartnerRegistry::new();
        register_builtin_backends(&mut with, &settings(Some("http://localhost/hook"))).unwrap();

        assert_eq!(without.backend_list(), vec!["example".to_string()]);
        assert_eq!(with.backend_list(), vec!["example".to_string(), "slack".to_string()]);
    }
}
