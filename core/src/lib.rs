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

//! Core components for signing HTTP requests from a client interceptor.
//!
//! This crate bridges a native [`http::Request`] to the request view a
//! signing algorithm works on, runs the algorithm, and copies the signed
//! result back onto the native request.
//!
//! ## Overview
//!
//! - **Traits**: [`SignRequest`] is the signing algorithm, [`ProvideCredential`]
//!   loads the credential it needs, and [`SignableRequest`] is the request view
//!   both operate on.
//! - **RequestAdapter**: the interception entry point. It builds a
//!   [`SigningRequest`], wraps it in a [`ContentChangeTracker`], signs it and
//!   writes headers, query and body back.
//! - **Body and Content**: the native body may be in memory or a blocking
//!   stream. Signers see it as [`Content`], which buffers streamed bytes so
//!   they can be replayed by the client after the signer hashed them.
//!
//! ## Example
//!
//! ```
//! use http::header::{HeaderName, HeaderValue};
//! use reqsign_interceptor_core::{
//!     Body, Credential, InterceptContext, RequestAdapter, Result, SignRequest,
//!     SignableRequest, StaticCredentialProvider,
//! };
//!
//! #[derive(Debug)]
//! struct MySigner;
//!
//! impl SignRequest for MySigner {
//!     type Credential = Credential;
//!
//!     fn sign_request(&self, req: &mut dyn SignableRequest, cred: &Credential) -> Result<()> {
//!         let value = format!("{} {}", cred.access_key_id, req.resource_path());
//!         req.add_header(
//!             HeaderName::from_static("x-signature"),
//!             HeaderValue::from_str(&value)?,
//!         );
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let adapter = RequestAdapter::new(
//!         "es",
//!         MySigner,
//!         StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//!     );
//!
//!     let mut req = http::Request::get("http://localhost:9200/a%2Cb/_search")
//!         .body(Body::Empty)?;
//!     adapter.intercept(&mut req, &InterceptContext::new())?;
//!
//!     assert_eq!(req.headers()["x-signature"], "access_key_id /a,b/_search");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod constants;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod env;
pub use env::{Env, OsEnv, StaticEnv};
mod config;
pub use config::Config;

mod body;
pub use body::{Body, BodyStream};
mod content;
pub use content::{Content, ReadLimitInfo};
mod credential;
pub use credential::{Credential, StaticCredentialProvider};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::{
    Endpoint, OriginalRequest, Parameters, SignableRequest, SigningRequest, SUPPORTED_METHODS,
};
mod tracker;
pub use tracker::ContentChangeTracker;
mod adapter;
pub use adapter::{InterceptContext, InterceptOutcome, RequestAdapter};
