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

use anyhow::Result;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqsign_interceptor::{
    default_client, Config, Credential, OsEnv, RequestAdapter, SignRequest, SignableRequest,
    StaticCredentialProvider,
};
use sha2::{Digest, Sha256};

const ES_ENDPOINT: &str = "https://search-my-es-endpoint-gjhfgfhgfhg.us-east-1.amazonaws.com";

/// A toy signer hashing the canonical request. Real deployments plug in an
/// actual signing algorithm here.
#[derive(Debug)]
struct DemoSigner;

impl SignRequest for DemoSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &mut dyn SignableRequest,
        cred: &Credential,
    ) -> reqsign_interceptor::Result<()> {
        let payload = match req.content() {
            Some(content) => {
                let mut buf = Vec::new();
                content.read_to_end(&mut buf)?;
                content.reset()?;
                hex::encode(Sha256::digest(&buf))
            }
            None => hex::encode(Sha256::digest(b"")),
        };

        let mut canonical = format!("{}\n{}\n", req.method(), req.resource_path());
        for (k, values) in req.parameters() {
            for v in values {
                canonical.push_str(&format!("{k}={v}&"));
            }
        }
        canonical.push('\n');
        canonical.push_str(&payload);

        let mut hasher = Sha256::new();
        hasher.update(&cred.secret_access_key);
        hasher.update(&canonical);
        let signature = hex::encode(hasher.finalize());

        req.add_header(
            HeaderName::from_static("x-amz-content-sha256"),
            HeaderValue::from_str(&payload)?,
        );
        req.add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!(
                "DEMO Credential={}/{}, Signature={signature}",
                cred.access_key_id,
                req.service_name()
            ))?,
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let endpoint = std::env::var("ES_ENDPOINT").unwrap_or_else(|_| ES_ENDPOINT.to_string());
    let config = Config::new("es").from_env(&OsEnv)?;
    let adapter = RequestAdapter::with_config(
        config,
        DemoSigner,
        StaticCredentialProvider::new("access_key_id", "secret_access_key"),
    );
    let client = default_client(adapter);

    // Cluster info
    let resp = client.get(&endpoint).send().await?;
    println!("GET {endpoint}: {}", resp.status());

    // Index a document
    let url = format!("{endpoint}/index_name/type_name/document_id");
    let resp = client
        .post(&url)
        .header("content-type", "application/json")
        .body(r#"{"test": "val"}"#)
        .send()
        .await?;
    println!("POST {url}: {}", resp.status());
    println!("{}", resp.text().await?);

    Ok(())
}
