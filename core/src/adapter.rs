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

use std::mem;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use http::uri::PathAndQuery;
use http::{Method, Request, Uri};
use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::utils::QUERY_ENCODE_SET;
use crate::{
    Body, Config, Content, ContentChangeTracker, Endpoint, Error, Parameters, ProvideCredential,
    Result, SignRequest, SignableRequest, SigningCredential, SigningRequest,
};

/// Per-request input supplied by the host client's pipeline.
#[derive(Debug, Clone, Default)]
pub struct InterceptContext {
    target_host: Option<Endpoint>,
}

impl InterceptContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint used for requests whose URI has no authority.
    pub fn with_target_host(mut self, endpoint: Endpoint) -> Self {
        self.target_host = Some(endpoint);
        self
    }

    /// Endpoint used for requests whose URI has no authority.
    pub fn target_host(&self) -> Option<&Endpoint> {
        self.target_host.as_ref()
    }
}

/// What interception changed on the native request besides its headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterceptOutcome {
    /// The body was replaced with the content set by the signer.
    pub content_changed: bool,
    /// The query was rebuilt from the parameters changed by the signer.
    pub uri_changed: bool,
}

/// RequestAdapter signs native requests in place.
///
/// It holds the configuration, a signer and a credential provider, and
/// carries no state between requests, so one adapter can be shared by all
/// requests of a client.
#[derive(Clone, Debug)]
pub struct RequestAdapter<K: SigningCredential> {
    config: Config,
    signer: Arc<dyn SignRequest<Credential = K>>,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
}

impl<K: SigningCredential> RequestAdapter<K> {
    /// Create a new adapter for given service with default config.
    pub fn new(
        service: &str,
        signer: impl SignRequest<Credential = K>,
        provider: impl ProvideCredential<Credential = K>,
    ) -> Self {
        Self::with_config(Config::new(service), signer, provider)
    }

    /// Create a new adapter with given config.
    pub fn with_config(
        config: Config,
        signer: impl SignRequest<Credential = K>,
        provider: impl ProvideCredential<Credential = K>,
    ) -> Self {
        Self {
            config,
            signer: Arc::new(signer),
            provider: Arc::new(provider),
        }
    }

    /// Config used by this adapter.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sign the native request in place.
    ///
    /// On error the native request is left as it was: its headers, URI and
    /// body are only replaced once signing succeeded and the new values have
    /// all been computed.
    pub fn intercept(
        &self,
        req: &mut Request<Body>,
        ctx: &InterceptContext,
    ) -> Result<InterceptOutcome> {
        let view = SigningRequest::build(&self.config, req, ctx.target_host())?;
        debug!(
            "signing request: {} {}{}",
            view.method(),
            view.endpoint(),
            view.resource_path()
        );

        let stream_taken = req.body().is_stream();
        let content = match mem::take(req.body_mut()) {
            Body::Stream(s) => Some(Content::from_stream(s, view.read_limit_info())),
            body => {
                let content = match &body {
                    Body::Bytes(bs) => Some(Content::from_bytes(bs.clone())),
                    Body::Empty if carries_entity(view.method()) => {
                        Some(Content::from_bytes(Bytes::new()))
                    }
                    Body::Empty | Body::Stream(_) => None,
                };
                *req.body_mut() = body;
                content
            }
        };
        let mut view = view.with_content(content);
        let original_parameters = view.parameters.clone();

        let content_changed = match self.sign(&mut view) {
            Ok(changed) => changed,
            Err(err) => {
                if stream_taken {
                    restore_body(req, view.into_native_content());
                }
                return Err(err);
            }
        };

        let uri = if view.parameters != original_parameters {
            match rebuild_uri(req.uri(), &view.parameters) {
                Ok(uri) => Some(uri),
                Err(err) => {
                    if stream_taken {
                        restore_body(req, view.into_native_content());
                    }
                    return Err(err);
                }
            }
        } else {
            None
        };

        let body = match prepare_body(view.content.take(), content_changed, stream_taken) {
            Ok(body) => body,
            Err(err) => {
                if stream_taken {
                    restore_body(req, view.into_native_content());
                }
                return Err(err);
            }
        };

        let outcome = InterceptOutcome {
            content_changed,
            uri_changed: uri.is_some(),
        };
        *req.headers_mut() = view.headers;
        if let Some(uri) = uri {
            *req.uri_mut() = uri;
        }
        if let Some(body) = body {
            *req.body_mut() = body;
        }

        debug!("request signed: {outcome:?}");
        Ok(outcome)
    }

    /// Load the credential and run the signer against a tracked view.
    ///
    /// Returns whether the signer replaced the content.
    fn sign(&self, view: &mut SigningRequest) -> Result<bool> {
        let credential = self
            .provider
            .provide_credential()?
            .ok_or_else(|| Error::credential_invalid("no credential found"))?;

        let mut tracker = ContentChangeTracker::new(view);
        self.signer.sign_request(&mut tracker, &credential)?;
        Ok(tracker.is_content_changed())
    }
}

/// Methods whose requests carry an entity even if it's empty.
fn carries_entity(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH].contains(method)
}

/// Compute the native body to install after signing, `None` keeps the
/// native body as is.
fn prepare_body(
    content: Option<Content>,
    content_changed: bool,
    stream_taken: bool,
) -> Result<Option<Body>> {
    if content_changed {
        let bs = match content {
            Some(content) => content.into_bytes().map_err(|e| {
                Error::content_invalid("failed to read content set by signer").with_source(e)
            })?,
            None => Bytes::new(),
        };
        return Ok(Some(Body::Bytes(bs)));
    }

    if !stream_taken {
        return Ok(None);
    }
    match content {
        Some(content) => content.into_body().map(Some).map_err(|e| {
            Error::content_invalid("failed to replay content read by signer").with_source(e)
        }),
        None => Ok(Some(Body::Empty)),
    }
}

/// Put a moved stream back onto the native request after a failure.
fn restore_body(req: &mut Request<Body>, content: Option<Content>) {
    let Some(content) = content else {
        return;
    };
    match content.into_body() {
        Ok(body) => *req.body_mut() = body,
        Err(err) => debug!("content can't be restored after signing failed: {err}"),
    }
}

/// Replace the query of `uri` with the encoded parameters.
fn rebuild_uri(uri: &Uri, parameters: &Parameters) -> Result<Uri> {
    let mut paq = match uri.path() {
        "" => "/".to_string(),
        v => v.to_string(),
    };

    let mut first = true;
    for (k, values) in parameters {
        for v in values {
            paq.push(if first { '?' } else { '&' });
            first = false;

            paq.extend(utf8_percent_encode(k, &QUERY_ENCODE_SET));
            if !v.is_empty() {
                paq.push('=');
                paq.extend(utf8_percent_encode(v, &QUERY_ENCODE_SET));
            }
        }
    }

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);
    Ok(Uri::from_parts(parts)?)
}
