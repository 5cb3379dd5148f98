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

//! Sign outgoing HTTP requests from inside the HTTP client.
//!
//! `reqsign-interceptor` bundles [`reqsign_interceptor_core`] with the
//! client integrations built on top of it.
//!
//! - The core types are re-exported at the crate root.
//! - With the `reqwest` feature (enabled by default), [`reqwest`] provides
//!   the middleware and [`default_client`] builds a signing client.
//!
//! ## Example
//!
//! ```no_run
//! use reqsign_interceptor::{default_adapter, default_client};
//! # use reqsign_interceptor::{Credential, Result, SignRequest, SignableRequest, StaticCredentialProvider};
//! # #[derive(Debug)]
//! # struct MySigner;
//! # impl SignRequest for MySigner {
//! #     type Credential = Credential;
//! #     fn sign_request(&self, _: &mut dyn SignableRequest, _: &Credential) -> Result<()> {
//! #         Ok(())
//! #     }
//! # }
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Service name, time offset and read limit can be overridden from env.
//! let adapter = default_adapter(
//!     "es",
//!     MySigner,
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//! )?;
//! let client = default_client(adapter);
//!
//! let resp = client.get("https://search.example.com/_search").send().await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```

pub use reqsign_interceptor_core::*;

#[cfg(feature = "reqwest")]
pub mod reqwest {
    //! reqwest integration, see [`SigningMiddleware`].
    pub use reqsign_interceptor_reqwest::*;
}

mod client;
pub use client::default_adapter;
#[cfg(feature = "reqwest")]
pub use client::default_client;
