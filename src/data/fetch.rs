//! HTTP fetching with a session cookie jar
//!
//! NLB sits behind a small JavaScript bot check: the first response is a page
//! that sets a cookie with `setCookie('name','value',...)` and calls
//! `location.reload()`. [`Fetcher::fetch_with_handshake`] performs that step
//! itself and re-requests the page once.

use crate::{FetchConfig, LottoError, Result};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{StatusCode, Url};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static COOKIE_CHALLENGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"setCookie\('([^']+)','([^']+)',").unwrap());

/// Does the body look like the bot-check page
pub fn needs_handshake(body: &str) -> bool {
    body.contains("setCookie") && body.contains("location.reload")
}

/// Cookie `(name, value)` demanded by a bot-check page
pub fn parse_cookie_challenge(body: &str) -> Option<(String, String)> {
    COOKIE_CHALLENGE
        .captures(body)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Blocking HTTP session shared by every request of one run
pub struct Fetcher {
    client: Client,
    jar: Arc<Jar>,
    handshake_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(browser_headers(config)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Fetcher {
            client,
            jar,
            handshake_delay: Duration::from_secs(config.handshake_delay_secs),
        })
    }

    /// Single GET; non-2xx responses are errors
    pub fn fetch(&self, url: &str) -> Result<String> {
        let (status, body) = self.get(url)?;
        success_body(url, status, body)
    }

    /// GET that answers the bot-check cookie challenge, re-fetching at most once.
    ///
    /// The challenge page may arrive with any status, so the markers are
    /// checked before the status. Only the returned response must be 2xx.
    pub fn fetch_with_handshake(&self, url: &str, cookie_domain: &str) -> Result<String> {
        let (status, body) = self.get(url)?;
        if !needs_handshake(&body) {
            return success_body(url, status, body);
        }

        log::debug!("Cookie protection detected for {} (HTTP {})", url, status);
        let Some((name, value)) = parse_cookie_challenge(&body) else {
            log::warn!("Bot check on {} without a readable cookie", url);
            return success_body(url, status, body);
        };

        self.add_cookie(url, cookie_domain, &name, &value)?;
        std::thread::sleep(self.handshake_delay);
        self.fetch(url)
    }

    fn get(&self, url: &str) -> Result<(StatusCode, String)> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(url, e))?;

        let status = response.status();
        let body = response.text().map_err(|e| fetch_error(url, e))?;
        Ok((status, body))
    }

    /// Put a cookie for `domain` into the session jar
    pub fn add_cookie(&self, url: &str, domain: &str, name: &str, value: &str) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| LottoError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        self.jar.add_cookie_str(
            &format!("{}={}; Domain={}; Path=/", name, value, domain),
            &parsed,
        );
        Ok(())
    }
}

fn success_body(url: &str, status: StatusCode, body: String) -> Result<String> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(LottoError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", status),
        })
    }
}

fn fetch_error(url: &str, error: reqwest::Error) -> LottoError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    LottoError::Fetch {
        url: url.to_string(),
        message,
    }
}

fn browser_headers(config: &FetchConfig) -> Result<HeaderMap> {
    let value = |text: &str| {
        HeaderValue::from_str(text)
            .map_err(|e| LottoError::Config(format!("Invalid header value {:?}: {}", text, e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, value(&config.accept_language)?);
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    for (name, v) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(v));
    }
    Ok(headers)
}
