use url::Url;

use crate::args::HttpMethod;

#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proxy endpoint with credentials split out of the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    url: Url,
    credentials: Option<ProxyCredentials>,
}

impl ProxySpec {
    #[must_use]
    pub const fn new(url: Url, credentials: Option<ProxyCredentials>) -> Self {
        Self { url, credentials }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn credentials(&self) -> Option<&ProxyCredentials> {
        self.credentials.as_ref()
    }
}

/// The request every worker issues for the whole run.
///
/// Built once from validated configuration and then shared read-only behind
/// an `Arc`; there are no setters after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: HttpMethod,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    proxy: Option<ProxySpec>,
}

impl RequestSpec {
    #[must_use]
    pub const fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            proxy: None,
        }
    }

    /// Headers are sent in the given order; repeated names are sent repeatedly.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Vec<u8>>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<ProxySpec>) -> Self {
        self.proxy = proxy;
        self
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[must_use]
    pub const fn proxy(&self) -> Option<&ProxySpec> {
        self.proxy.as_ref()
    }
}
