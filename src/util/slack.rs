use std::time::Duration;

use reqwest::Client;
use serde_json::json;

const SLACK_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn send_slack_alert(client: &Client, webhook_url: &str, message: &str) -> Result<(), reqwest::Error> {
    let payload = json!({ "text": message });

    client
        .post(webhook_url)
        .json(&payload)
        .timeout(SLACK_TIMEOUT)
        .send()
        .await?
        .error_for_status()?; // 2xx 아닌 경우 Err

    Ok(())
}
