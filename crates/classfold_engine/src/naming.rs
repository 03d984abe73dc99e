//! Naming strategies: turning a class combination into a readable class name.
//!
//! A strategy is free to return arbitrary text, optionally wrapped in
//! `<result>…</result>`; the [`NameResolver`](crate::resolver::NameResolver)
//! sanitizes it and falls back to a hashed name whenever a strategy fails.

use std::time::Duration;

use serde::Deserialize;

/// Errors produced while asking a strategy for a name.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    /// The request did not complete within the configured timeout.
    #[error("naming request timed out")]
    Timeout,

    /// The request failed at the transport or HTTP level.
    #[error("naming request failed: {0}")]
    Transport(String),

    /// The service answered with something other than the expected JSON shape.
    #[error("malformed naming response: {0}")]
    Malformed(String),

    /// Every attempt produced a name that was empty after sanitizing.
    #[error("no usable name after {attempts} attempts")]
    EmptyName {
        /// Number of attempts made.
        attempts: usize,
    },
}

/// Produces a human-readable class name for an element's class combination.
pub trait NamingStrategy: Send {
    /// Suggests a name for `class_string` on an element named `tag`.
    fn suggest(&mut self, tag: Option<&str>, class_string: &str) -> Result<String, NamingError>;
}

/// Builds the few-shot prompt sent to a text-completion naming service.
pub fn naming_prompt(tag: Option<&str>, class_string: &str) -> String {
    let info = serde_json::json!({ "tag": tag.unwrap_or(""), "class": class_string });
    format!(
        r#"Examples:
  {{"tag":"div","class":"bg-red-500"}} -> <result>red-background-container</result>
  {{"tag":"ul","class":"mt-8 space-y-3 text-sm leading-6 text-gray-600"}} -> <result>spaced-list-container</result>
  {{"tag":"h3","class":"text-lg font-semibold leading-8 text-gray-900"}} -> <result>medium-heading</result>
  {{"tag":"Link","class":"text-blue-500"}} -> <result>blue-link</result>

Given the element below, write one CSS class name describing the styles its utility classes apply.
Answer with the class name only, wrapped like <result>class-name</result>.
{info} -> "#
    )
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    response: CompletionBody,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    response: String,
}

/// Naming strategy backed by an HTTP text-completion endpoint.
///
/// Sends `GET` to [`request_url`] and expects
/// `{"response": {"response": "<result>name</result>"}}`.
pub struct HttpNamingStrategy {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpNamingStrategy {
    /// Creates a strategy with a per-request `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NamingError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("classfold/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| NamingError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl NamingStrategy for HttpNamingStrategy {
    fn suggest(&mut self, tag: Option<&str>, class_string: &str) -> Result<String, NamingError> {
        let prompt = naming_prompt(tag, class_string);
        let response = self
            .client
            .get(request_url(&self.endpoint, &prompt))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;
        let body: CompletionEnvelope = response
            .json()
            .map_err(|e| NamingError::Malformed(e.to_string()))?;
        Ok(body.response.response)
    }
}

/// Composes the request URL for `prompt`.
///
/// An endpoint ending in `=` or `/` is a prefix and receives the encoded
/// prompt directly (`http://host/ask?q=` becomes `http://host/ask?q=<prompt>`).
/// Any other endpoint gets it as the `prompt` query parameter.
pub fn request_url(endpoint: &str, prompt: &str) -> String {
    let encoded = urlencoding::encode(prompt);
    if endpoint.ends_with('=') || endpoint.ends_with('/') {
        format!("{endpoint}{encoded}")
    } else if endpoint.contains('?') {
        format!("{endpoint}&prompt={encoded}")
    } else {
        format!("{endpoint}?prompt={encoded}")
    }
}

fn classify(err: reqwest::Error) -> NamingError {
    if err.is_timeout() {
        NamingError::Timeout
    } else {
        NamingError::Transport(err.to_string())
    }
}
