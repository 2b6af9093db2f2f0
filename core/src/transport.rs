//! Blocking `HttpSend` implementation backed by ureq.

use std::fmt;
use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpSend};

/// Sends requests through a pooled ureq agent, attaching the default
/// headers to each one.
#[derive(Clone)]
pub struct UreqSender {
    agent: Agent,
    default_headers: Vec<(String, String)>,
}

impl UreqSender {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        // 4xx/5xx come back as responses so the client can classify them.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            default_headers: default_headers(api_key),
        }
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }
}

impl fmt::Debug for UreqSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqSender")
            .field("default_headers", &self.default_headers.len())
            .finish_non_exhaustive()
    }
}

/// Headers attached to every request made with `api_key`.
pub fn default_headers(api_key: &str) -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("apikey".to_string(), api_key.to_string()),
        ("Authorization".to_string(), format!("Bearer {api_key}")),
        ("Prefer".to_string(), "return=representation".to_string()),
    ]
}

/// Defaults first, minus any the request overrides, then the request's own.
pub fn merge_headers<'a>(
    defaults: &'a [(String, String)],
    overrides: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    defaults
        .iter()
        .filter(|(name, _)| !overrides.iter().any(|(o, _)| o.eq_ignore_ascii_case(name)))
        .chain(overrides.iter())
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect()
}

impl HttpSend for UreqSender {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = merge_headers(&self.default_headers, &request.headers);
        let body = request.body.as_deref().unwrap_or_default();

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &headers {
                    builder = builder.header(*name, *value);
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(request.url.as_str());
                for (name, value) in &headers {
                    builder = builder.header(*name, *value);
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                let mut builder = match request.method {
                    HttpMethod::Post => self.agent.post(request.url.as_str()),
                    HttpMethod::Put => self.agent.put(request.url.as_str()),
                    _ => self.agent.patch(request.url.as_str()),
                };
                for (name, value) in &headers {
                    builder = builder.header(*name, *value);
                }
                builder.send(body)
            }
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // ureq stops reading at 10 MiB unless the limit is lifted.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a [(&'a str, &'a str)], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
            .collect()
    }

    #[test]
    fn default_headers_carry_key_twice() {
        let headers = default_headers("secret");
        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("apikey".to_string(), "secret".to_string()),
                ("Authorization".to_string(), "Bearer secret".to_string()),
                ("Prefer".to_string(), "return=representation".to_string()),
            ]
        );
    }

    #[test]
    fn override_replaces_default_case_insensitively() {
        let defaults = default_headers("k");
        let overrides = vec![("content-type".to_string(), "image/png".to_string())];
        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(header(&merged, "Content-Type"), vec!["image/png"]);
        assert_eq!(header(&merged, "apikey"), vec!["k"]);
        assert_eq!(merged.len(), 5);
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let defaults = default_headers("k");
        let merged = merge_headers(&defaults, &[]);
        assert_eq!(merged.len(), defaults.len());
        assert_eq!(header(&merged, "Prefer"), vec!["return=representation"]);
    }

    #[test]
    fn sender_exposes_its_defaults() {
        let sender = UreqSender::new("k", Duration::from_secs(1));
        assert_eq!(sender.default_headers(), default_headers("k").as_slice());
    }
}
