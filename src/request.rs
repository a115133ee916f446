//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::method::Method;

/// An incoming request with its query string already percent-decoded.
///
/// Bodies are never read: every endpoint is a `GET` driven by the query.
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn from_parts(
        method: Method,
        parts: &http::request::Parts,
        params: HashMap<String, String>,
    ) -> Self {
        let query = parts.uri.query().map(parse_query).unwrap_or_default();
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        Self {
            method,
            path: parts.uri.path().to_owned(),
            query,
            headers,
            params,
        }
    }

    /// Builds a request without a connection, for handler tests.
    pub fn synthetic(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (path_and_query, Vec::new()),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: Vec::new(),
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a query parameter. `?order_id=%231001` yields `"#1001"`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Named path parameter: `/orders/{id}` on `/orders/42` gives `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
