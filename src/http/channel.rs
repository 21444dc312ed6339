//! HTTP channel: the transport behind every probe
//!
//! One channel targets one URL and one injectable parameter. Each request
//! places the probe text into that parameter — a query pair for GET, an
//! urlencoded form field for POST — and hands back the response body.
//! Transport failures are returned as-is; the probing core never retries.

use crate::core::prober::Transport;
use crate::http::rate_limit::RateLimiter;
use anyhow::{Context, Result};
use reqwest::{header, redirect::Policy, Client, Method};
use std::collections::HashMap;
use url::Url;

pub struct HttpChannel {
    client: Client,
    limiter: RateLimiter,
    url: Url,
    method: Method,
    param: String,
    /// Base form fields for POST targets, parsed from --data.
    form: Option<Vec<(String, String)>>,
    headers: HashMap<String, String>,
    cookies: Option<String>,
}

impl HttpChannel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: &str,
        param: &str,
        method: Method,
        data: Option<&str>,
        headers: HashMap<String, String>,
        cookies: Option<String>,
        rate: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .build()?;

        let url = Url::parse(url).context("invalid target URL")?;
        let form = data
            .map(|d| {
                serde_urlencoded::from_str::<Vec<(String, String)>>(d)
                    .context("invalid --data body")
            })
            .transpose()?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(rate),
            url,
            method,
            param: param.to_string(),
            form,
            headers,
            cookies,
        })
    }

    fn build_get_url(&self, payload: &str) -> Result<Url> {
        inject_query_param(&self.url, &self.param, payload)
    }

    fn build_form_body(&self, payload: &str) -> Result<String> {
        let mut pairs = self.form.clone().unwrap_or_default();
        let mut found = false;
        for (k, v) in pairs.iter_mut() {
            if k == &self.param {
                *v = payload.to_string();
                found = true;
            }
        }
        if !found {
            pairs.push((self.param.clone(), payload.to_string()));
        }
        Ok(serde_urlencoded::to_string(&pairs)?)
    }
}

impl Transport for HttpChannel {
    async fn request(&self, text: &str) -> Result<String> {
        self.limiter.wait().await;

        let mut request = if self.method == Method::POST || self.form.is_some() {
            self.client
                .request(Method::POST, self.url.clone())
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(self.build_form_body(text)?)
        } else {
            self.client
                .request(self.method.clone(), self.build_get_url(text)?)
        };

        for (key, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::from_bytes(key.as_bytes()),
                header::HeaderValue::from_str(value),
            ) {
                request = request.header(name, value);
            }
        }
        if let Some(cookies) = &self.cookies {
            request = request.header(header::COOKIE, cookies);
        }

        let response = request.send().await?;
        Ok(response.text().await?)
    }
}

/// Replace (or append) one query parameter's value.
pub fn inject_query_param(base: &Url, param: &str, payload: &str) -> Result<Url> {
    let mut url = base.clone();
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut found = false;
    for (k, v) in pairs.iter_mut() {
        if k == param {
            *v = payload.to_string();
            found = true;
        }
    }
    if !found {
        pairs.push((param.to_string(), payload.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url)
}

/// Parse repeated `-H "Name: value"` flags.
pub fn parse_headers(raw: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for entry in raw {
        if let Some((name, value)) = entry.split_once(':') {
            headers.insert(name.trim().to_string(), value.trim().to_string());
        } else {
            tracing::warn!("Ignoring malformed header '{}'", entry);
        }
    }
    headers
}
