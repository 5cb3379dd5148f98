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

use std::io::Read;

use http::header::{HeaderName, HeaderValue};
use reqsign_interceptor_core::{
    Body, Config, Env, InterceptContext, OsEnv, ProvideCredential, RequestAdapter, Result,
    SignRequest, SignableRequest, SigningCredential,
};
use sha2::{Digest, Sha256};

#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug)]
struct MyCredentialLoader;

impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    fn provide_credential(&self) -> Result<Option<Self::Credential>> {
        let api_key = OsEnv.var("MY_API_KEY").unwrap_or_default();
        let api_secret = OsEnv.var("MY_API_SECRET").unwrap_or_default();

        // For demo purposes, use dummy credentials if none are provided
        if api_key.is_empty() || api_secret.is_empty() {
            println!("No credentials found in environment, using demo credentials");
            return Ok(Some(MyCredential {
                api_key: "demo-api-key".to_string(),
                api_secret: "demo-api-secret".to_string(),
            }));
        }

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

#[derive(Debug)]
struct MySigner;

impl SignRequest for MySigner {
    type Credential = MyCredential;

    fn sign_request(
        &self,
        req: &mut dyn SignableRequest,
        credential: &Self::Credential,
    ) -> Result<()> {
        let mut hasher = Sha256::new();
        hasher.update(req.method().as_str());
        hasher.update(req.resource_path());
        if let Some(content) = req.content() {
            let mut buf = Vec::new();
            content.read_to_end(&mut buf)?;
            content.reset()?;
            hasher.update(&buf);
        }
        hasher.update(&credential.api_secret);

        req.add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(&credential.api_key)?,
        );
        // In a real implementation the signature would be an HMAC
        req.add_header(
            HeaderName::from_static("x-api-signature"),
            HeaderValue::from_str(&hex::encode(hasher.finalize()))?,
        );

        Ok(())
    }
}

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let config = Config::new("my-api").from_env(&OsEnv)?;
    let adapter = RequestAdapter::with_config(config, MySigner, MyCredentialLoader);

    let mut req = http::Request::post("https://api.example.com/v1/users")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"reqsign"}"#))?;

    match adapter.intercept(&mut req, &InterceptContext::new()) {
        Ok(outcome) => {
            println!("Request signed successfully: {outcome:?}");
            println!("Headers: {:?}", req.headers());
        }
        Err(e) => {
            eprintln!("Failed to sign request: {e}");
        }
    }

    Ok(())
}
