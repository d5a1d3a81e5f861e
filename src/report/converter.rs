use anyhow::{bail, ensure, Context, Result};
use log::{debug, info};
use scraper::{Html, Selector};
use std::{sync::LazyLock, time::Duration};

use crate::config::ConverterConfig;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

static CONVERTED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("textarea#cardmarket").expect("valid selector"));

/// Client for the web form that rewrites a decklist into marketplace
/// want-list lines (with card abilities filled in).
pub struct Converter {
    url: String,
    client: reqwest::blocking::Client,
}

impl Converter {
    pub fn new(config: &ConverterConfig) -> Result<Converter> {
        ensure!(!config.url.is_empty(), "converter url must not be empty");

        let client = reqwest::blocking::ClientBuilder::new()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build http client")?;

        Ok(Converter {
            url: config.url.clone(),
            client,
        })
    }

    /// One attempt, no retries. Any failure is returned to the caller, which
    /// falls back to the manual format.
    pub fn convert(&self, decklist: &str) -> Result<String> {
        info!("POST `{}` ({} bytes)", self.url, decklist.len());

        let response = self
            .client
            .post(&self.url)
            .form(&[("decklist", decklist)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            bail!("converter returned status {}", status);
        }

        let body = response.text()?;
        debug!("received {} bytes", body.len());
        extract_converted(&body)
    }
}

/// Reads the converted list out of the converter's result page.
pub fn extract_converted(body: &str) -> Result<String> {
    let document = Html::parse_document(body);
    let Some(textarea) = document.select(&CONVERTED).next() else {
        bail!("no converted text in response");
    };

    let text: String = textarea.text().collect();
    let text = text.trim();
    ensure!(!text.is_empty(), "converted text is empty");

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_textarea_contents() {
        let body = r#"<html><body><form>
<textarea id="decklist">1 Dreepy TWM 128</textarea>
<textarea id="cardmarket" rows="20">
Dreepy [Petty Grudge | Bite] [TWM]
Farfetch&#39;d [Leek Slap] [TWM]
</textarea></form></body></html>"#;

        assert_eq!(
            extract_converted(body).unwrap(),
            "Dreepy [Petty Grudge | Bite] [TWM]\nFarfetch'd [Leek Slap] [TWM]"
        );
    }

    #[test]
    fn missing_textarea_is_an_error() {
        let body = "<html><body><p>Service unavailable</p></body></html>";
        assert!(extract_converted(body).is_err());
    }

    #[test]
    fn empty_textarea_is_an_error() {
        let body = r#"<textarea id="cardmarket">   </textarea>"#;
        assert!(extract_converted(body).is_err());
    }

    #[test]
    fn empty_url_is_rejected() {
        let config = ConverterConfig {
            url: String::new(),
            ..ConverterConfig::default()
        };
        assert!(Converter::new(&config).is_err());
    }
}
