use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{error::HttpError, http::headers::Headers};

/// A decoded HTTP request.
///
/// The head is filled in by the head parser before any user handler runs. The
/// content stays empty unless a body reading handler fills it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The request method, e.g. `GET`.
    pub method: String,
    /// The protocol version token, e.g. `HTTP/1.0`.
    pub version: String,
    /// The request target exactly as received.
    pub fullpath: String,
    /// The request target without query and fragment, with dot segments resolved.
    pub path: String,
    /// Decoded query string parameters. The last occurrence of a name wins.
    pub params: BTreeMap<String, String>,
    /// The request headers.
    pub headers: Headers,
    /// The request payload.
    pub content: Vec<u8>,
}

impl Request {
    /// Sets `fullpath` and derives `path` and `params` from it.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.fullpath = target.into();
        self.path = normalize_path(&self.fullpath);
        self.params = serde_urlencoded::from_str::<Vec<(String, String)>>(self.query_string())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default();
    }

    /// The raw query string, without the leading `?`. Empty if there is none.
    #[must_use]
    pub fn query_string(&self) -> &str {
        let without_fragment = self.fullpath.split('#').next().unwrap_or_default();
        without_fragment
            .split_once('?')
            .map_or("", |(_, query)| query)
    }

    /// Deserializes the query string into `T`.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidQuery` if the query does not match `T`.
    pub fn query<T>(&self) -> Result<T, HttpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_urlencoded::from_str(self.query_string()).map_err(|e| HttpError::InvalidQuery(e.to_string()))
    }

    /// Replaces the request payload.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }
}

/// Strips query and fragment, collapses repeated slashes and resolves `.` and `..`
/// segments without climbing above the root. Targets not starting with `/` are kept.
fn normalize_path(target: &str) -> String {
    let raw = target.split(['?', '#']).next().unwrap_or_default();
    if raw.is_empty() {
        return "/".to_string();
    }
    if !raw.starts_with('/') {
        return raw.to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = String::with_capacity(raw.len());
    path.push('/');
    path.push_str(&segments.join("/"));
    if raw.ends_with('/') && !segments.is_empty() {
        path.push('/');
    }
    path
}
