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

//! reqwest middleware that signs every outgoing request.
//!
//! [`SigningMiddleware`] wraps a [`RequestAdapter`] and runs it right before
//! the request is handed to the next middleware:
//!
//! ```no_run
//! use reqsign_interceptor_core::{RequestAdapter, StaticCredentialProvider};
//! use reqsign_interceptor_reqwest::SigningMiddleware;
//! # use reqsign_interceptor_core::{Credential, Result, SignRequest, SignableRequest};
//! # #[derive(Debug)]
//! # struct MySigner;
//! # impl SignRequest for MySigner {
//! #     type Credential = Credential;
//! #     fn sign_request(&self, _: &mut dyn SignableRequest, _: &Credential) -> Result<()> {
//! #         Ok(())
//! #     }
//! # }
//!
//! # async fn example() -> reqwest_middleware::Result<()> {
//! let adapter = RequestAdapter::new(
//!     "es",
//!     MySigner,
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//! );
//! let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
//!     .with(SigningMiddleware::new(adapter))
//!     .build();
//!
//! let resp = client
//!     .get("http://localhost:9200/_cluster/health")
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use http::Extensions;
use http_body_util::BodyExt;
use log::debug;
use reqsign_interceptor_core::utils::check_percent_encoding;
use reqsign_interceptor_core::{
    Body, Error, InterceptContext, RequestAdapter, Result, SigningCredential,
};
use reqwest::{Request, Response, Url};
use reqwest_middleware::{Middleware, Next};

/// SigningMiddleware signs requests sent by a `reqwest_middleware` client.
///
/// Streaming bodies are collected into memory before signing, since signers
/// read content synchronously. Bodies the signer doesn't replace are sent
/// as they were.
#[derive(Clone, Debug)]
pub struct SigningMiddleware<K: SigningCredential> {
    adapter: RequestAdapter<K>,
}

impl<K: SigningCredential> SigningMiddleware<K> {
    /// Create a new middleware from given adapter.
    pub fn new(adapter: RequestAdapter<K>) -> Self {
        Self { adapter }
    }

    /// Sign a reqwest request in place.
    ///
    /// The request is only updated after signing succeeded.
    pub async fn sign(&self, req: &mut Request) -> Result<()> {
        // `http::Uri` drops the fragment, so it is checked here.
        if let Some(fragment) = req.url().fragment() {
            check_percent_encoding(fragment, "fragment")?;
        }

        let (body, original) = match req.body_mut().take() {
            None => (Body::Empty, None),
            Some(b) => match b.as_bytes().map(Bytes::copy_from_slice) {
                Some(bs) => (Body::Bytes(bs), Some(b)),
                None => {
                    let bs = b
                        .collect()
                        .await
                        .map_err(|e| {
                            Error::content_invalid("failed to buffer streaming body")
                                .with_source(e)
                        })?
                        .to_bytes();
                    debug!("buffered streaming body of {} bytes for signing", bs.len());
                    (Body::Bytes(bs.clone()), Some(reqwest::Body::from(bs)))
                }
            },
        };
        // Keep the request whole even if signing fails.
        *req.body_mut() = original;

        let mut native = http::Request::builder()
            .method(req.method().clone())
            .uri(req.url().as_str())
            .version(req.version())
            .body(body)?;
        *native.headers_mut() = req.headers().clone();

        let outcome = self
            .adapter
            .intercept(&mut native, &InterceptContext::new())?;

        let (parts, body) = native.into_parts();
        let url = if outcome.uri_changed {
            let url = Url::parse(&parts.uri.to_string()).map_err(|e| {
                Error::request_invalid("signed uri is not a valid url").with_source(e)
            })?;
            Some(url)
        } else {
            None
        };
        let body = if outcome.content_changed {
            Some(reqwest::Body::from(body.into_bytes()?))
        } else {
            None
        };

        *req.headers_mut() = parts.headers;
        if let Some(url) = url {
            *req.url_mut() = url;
        }
        if let Some(body) = body {
            *req.body_mut() = Some(body);
        }
        Ok(())
    }
}

#[async_trait]
impl<K: SigningCredential> Middleware for SigningMiddleware<K> {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.sign(&mut req)
            .await
            .map_err(reqwest_middleware::Error::middleware)?;
        next.run(req, extensions).await
    }
}
