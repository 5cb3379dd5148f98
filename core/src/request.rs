// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use http::header::{self, HeaderName, HeaderValue};
use http::uri::{Authority, Scheme};
use http::{HeaderMap, Method, Request, Uri, Version};
use indexmap::IndexMap;

use crate::utils::{check_percent_encoding, decode_path};
use crate::{Body, Config, Content, Error, ReadLimitInfo, Result};

/// Query parameters of a signable request, in the order they first appeared.
pub type Parameters = IndexMap<String, Vec<String>>;

/// HTTP methods a request can be signed with.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::PATCH,
    Method::OPTIONS,
];

/// SignableRequest is the request view a [`SignRequest`](crate::SignRequest)
/// works on.
///
/// The view is detached from the native request: signers read and mutate it,
/// and the adapter copies the result back once signing succeeded.
pub trait SignableRequest: Debug {
    /// Name of the service this request targets.
    fn service_name(&self) -> &str;

    /// HTTP method of this request.
    fn method(&self) -> &Method;

    /// Scheme and authority this request is sent to.
    fn endpoint(&self) -> &Endpoint;

    /// Percent-decoded path of this request.
    fn resource_path(&self) -> &str;

    /// Query parameters of this request.
    fn parameters(&self) -> &Parameters;

    /// Headers of this request.
    fn headers(&self) -> &HeaderMap;

    /// Clock skew in seconds to apply to the signing time.
    fn time_offset(&self) -> i64;

    /// Content of this request, `None` if the request carries no entity.
    ///
    /// Reading moves the content cursor, call [`Content::reset`] to rewind.
    fn content(&mut self) -> Option<&mut Content>;

    /// Content bytes if they are already held in memory.
    fn content_unwrapped(&self) -> Option<&[u8]>;

    /// How many bytes of the content can be read and still be replayed.
    fn read_limit_info(&self) -> ReadLimitInfo;

    /// The request line as it was before signing.
    fn original_request(&self) -> &OriginalRequest;

    /// Set a header, replacing all existing values.
    fn add_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Append a value to a query parameter.
    fn add_parameter(&mut self, name: &str, value: &str);

    /// Replace the content of this request.
    fn set_content(&mut self, content: Content);
}

/// Endpoint is the scheme and authority a request is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: Scheme,
    authority: Authority,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(scheme: Scheme, authority: Authority) -> Self {
        Self { scheme, authority }
    }

    /// Scheme of this endpoint.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Authority of this endpoint.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Host of this endpoint.
    pub fn host(&self) -> &str {
        self.authority.host()
    }

    /// Explicit port of this endpoint.
    pub fn port(&self) -> Option<u16> {
        self.authority.port_u16()
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Parse an endpoint like `https://search-domain.es.amazonaws.com` or
/// `localhost:9200`. The scheme defaults to `http`.
impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let uri: Uri = s.parse()?;
        let authority = uri.authority().cloned().ok_or_else(|| {
            Error::request_invalid(format!("endpoint {s:?} must contain a host"))
        })?;
        if uri.path_and_query().is_some_and(|paq| paq.as_str() != "/") {
            return Err(Error::request_invalid(format!(
                "endpoint {s:?} must not contain a path or query"
            )));
        }

        Ok(Self {
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
        })
    }
}

/// Snapshot of the native request line taken before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URI exactly as the caller built it.
    pub uri: Uri,
    /// HTTP version.
    pub version: Version,
}

/// SigningRequest is the [`SignableRequest`] built from a native request.
#[derive(Debug)]
pub struct SigningRequest {
    pub(crate) service: String,
    pub(crate) method: Method,
    pub(crate) endpoint: Endpoint,
    pub(crate) resource_path: String,
    pub(crate) parameters: Parameters,
    pub(crate) headers: HeaderMap,
    pub(crate) time_offset: i64,
    pub(crate) content: Option<Content>,
    /// Content replaced by the signer, kept so a moved stream can be handed
    /// back if signing fails.
    pub(crate) displaced: Option<Content>,
    pub(crate) read_limit: ReadLimitInfo,
    pub(crate) original: OriginalRequest,
}

impl SigningRequest {
    /// Build a signing view from the native request without touching it.
    ///
    /// The body is not attached here, see [`SigningRequest::with_content`].
    /// `target_host` is used when the request URI carries no authority.
    pub fn build(
        config: &Config,
        req: &Request<Body>,
        target_host: Option<&Endpoint>,
    ) -> Result<Self> {
        let method = req.method();
        if !SUPPORTED_METHODS.contains(method) {
            return Err(Error::request_invalid(format!(
                "unsupported http method: {method}"
            )));
        }

        let uri = req.uri();
        let endpoint = match uri.authority() {
            Some(authority) => Endpoint::new(
                uri.scheme().cloned().unwrap_or(Scheme::HTTP),
                authority.clone(),
            ),
            None => target_host.cloned().ok_or_else(|| {
                Error::request_invalid(
                    "request without authority is invalid for signing: no target host is set",
                )
            })?,
        };

        let raw_path = match uri.path() {
            "" => "/",
            v => v,
        };
        let resource_path = decode_path(raw_path)?.into_owned();

        let mut parameters = Parameters::new();
        if let Some(query) = uri.query() {
            check_percent_encoding(query, "query")?;
            for (k, v) in form_urlencoded::parse(query.as_bytes()) {
                parameters
                    .entry(k.into_owned())
                    .or_default()
                    .push(v.into_owned());
            }
        }

        let mut headers = HeaderMap::with_capacity(req.headers().len());
        for (name, value) in req.headers() {
            // Signers don't sign the length, a stale one must not reach them.
            if name == header::CONTENT_LENGTH {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        Ok(SigningRequest {
            service: config.service.clone(),
            method: method.clone(),
            endpoint,
            resource_path,
            parameters,
            headers,
            time_offset: config.time_offset,
            content: None,
            displaced: None,
            read_limit: ReadLimitInfo::new(config.read_limit),
            original: OriginalRequest {
                method: method.clone(),
                uri: uri.clone(),
                version: req.version(),
            },
        })
    }

    /// Attach the content exposed to the signer.
    pub fn with_content(mut self, content: Option<Content>) -> Self {
        self.content = content;
        self
    }

    /// The content the native request started with.
    ///
    /// This is the first content replaced by the signer if any, otherwise
    /// the current one.
    pub(crate) fn into_native_content(self) -> Option<Content> {
        self.displaced.or(self.content)
    }
}

impl SignableRequest for SigningRequest {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn resource_path(&self) -> &str {
        &self.resource_path
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn time_offset(&self) -> i64 {
        self.time_offset
    }

    fn content(&mut self) -> Option<&mut Content> {
        self.content.as_mut()
    }

    fn content_unwrapped(&self) -> Option<&[u8]> {
        self.content.as_ref().and_then(|c| c.as_bytes())
    }

    fn read_limit_info(&self) -> ReadLimitInfo {
        self.read_limit
    }

    fn original_request(&self) -> &OriginalRequest {
        &self.original
    }

    fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn add_parameter(&mut self, name: &str, value: &str) {
        self.parameters
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn set_content(&mut self, content: Content) {
        let old = self.content.replace(content);
        if self.displaced.is_none() {
            self.displaced = old;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn build(req: &Request<Body>) -> Result<SigningRequest> {
        SigningRequest::build(&Config::new("es"), req, None)
    }

    #[test]
    fn test_build_from_absolute_uri() {
        let req = Request::post("https://search.example.com:9200/my-index/_search?q=a&size=10&q=b")
            .header("content-type", "application/json")
            .header("content-length", "42")
            .header("x-multi", "1")
            .header("x-multi", "2")
            .body(Body::from("{}"))
            .unwrap();

        let view = build(&req).expect("must build");
        assert_eq!(view.service_name(), "es");
        assert_eq!(view.method(), Method::POST);
        assert_eq!(
            view.endpoint().to_string(),
            "https://search.example.com:9200"
        );
        assert_eq!(view.endpoint().port(), Some(9200));
        assert_eq!(view.resource_path(), "/my-index/_search");
        assert_eq!(
            view.parameters().get("q"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            view.parameters().keys().collect::<Vec<_>>(),
            vec!["q", "size"]
        );
        assert!(view.headers().get(header::CONTENT_LENGTH).is_none());
        assert_eq!(view.headers()["content-type"], "application/json");
        assert_eq!(view.headers().get_all("x-multi").iter().count(), 2);
        assert_eq!(view.original_request().uri, *req.uri());
        assert!(view.content_unwrapped().is_none());
    }

    #[test]
    fn test_build_uses_target_host_for_origin_form() {
        let req = Request::get("/_cluster/health").body(Body::Empty).unwrap();
        let host: Endpoint = "localhost:9200".parse().unwrap();

        let view = SigningRequest::build(&Config::new("es"), &req, Some(&host)).unwrap();
        assert_eq!(view.endpoint().to_string(), "http://localhost:9200");

        let err = build(&req).expect_err("must fail without target host");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test_case("/foo-2017-02-25%2Cfoo-2017-02-26/_search", "/foo-2017-02-25,foo-2017-02-26/_search"; "encoded comma")]
    #[test_case("/a%20b", "/a b"; "encoded space")]
    #[test_case("/a%252Cb", "/a%2Cb"; "decoded once")]
    fn test_build_decodes_path(raw: &str, expected: &str) {
        let req = Request::get(format!("http://localhost{raw}"))
            .body(Body::Empty)
            .unwrap();
        assert_eq!(build(&req).unwrap().resource_path(), expected);
    }

    #[test_case("http://localhost/query%zz?a=b"; "bad path escape")]
    #[test_case("http://localhost/foo?q=!@*%"; "bad query escape")]
    fn test_build_rejects_malformed_uri(uri: &str) {
        let req = Request::get(uri).body(Body::Empty).unwrap();
        let err = build(&req).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(err.message().contains("malformed URI"));
    }

    #[test]
    fn test_build_rejects_unsupported_method() {
        let req = Request::builder()
            .method(Method::TRACE)
            .uri("http://localhost/")
            .body(Body::Empty)
            .unwrap();
        let err = build(&req).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_mutators() {
        let req = Request::put("http://localhost/a?x=1")
            .header("x-amz-date", "old")
            .body(Body::Empty)
            .unwrap();
        let mut view = build(&req).unwrap().with_content(Some(Content::from("old")));

        view.add_header(
            HeaderName::from_static("x-amz-date"),
            HeaderValue::from_static("new"),
        );
        view.add_parameter("x", "2");
        view.add_parameter("X-Amz-Signature", "abc");
        view.set_content(Content::from("new"));
        view.set_content(Content::from("newer"));

        assert_eq!(view.headers()["x-amz-date"], "new");
        assert_eq!(view.headers().get_all("x-amz-date").iter().count(), 1);
        assert_eq!(view.parameters()["x"], vec!["1", "2"]);
        assert_eq!(view.parameters()["X-Amz-Signature"], vec!["abc"]);
        assert_eq!(view.content_unwrapped(), Some(&b"newer"[..]));

        let native = view.into_native_content().unwrap();
        assert_eq!(native.as_bytes(), Some(&b"old"[..]));
    }

    #[test_case("https://search.example.com", "https", "search.example.com", None; "https")]
    #[test_case("localhost:9200", "http", "localhost", Some(9200); "default scheme")]
    fn test_parse_endpoint(input: &str, scheme: &str, host: &str, port: Option<u16>) {
        let ep: Endpoint = input.parse().unwrap();
        assert_eq!(ep.scheme().as_str(), scheme);
        assert_eq!(ep.host(), host);
        assert_eq!(ep.port(), port);
    }

    #[test]
    fn test_parse_endpoint_rejects_path() {
        assert!("http://localhost/index".parse::<Endpoint>().is_err());
    }
}
