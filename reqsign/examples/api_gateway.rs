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

use anyhow::Result;
use http::header::{HeaderValue, AUTHORIZATION};
use reqsign_interceptor::{
    default_adapter, default_client, Credential, SignRequest, SignableRequest,
    StaticCredentialProvider,
};

/// The invoke URL of an API, usually
/// `https://{api_id}.execute-api.{region}.amazonaws.com/{stage}`.
const INVOKE_URL: &str = "https://api_id.execute-api.api-region.amazonaws.com/stage";

/// Signs with the access key only, enough to show which parts of the request
/// reach the signer.
#[derive(Debug)]
struct KeyOnlySigner;

impl SignRequest for KeyOnlySigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        req: &mut dyn SignableRequest,
        cred: &Credential,
    ) -> reqsign_interceptor::Result<()> {
        println!(
            "signing {} {}{} with {:?}",
            req.method(),
            req.endpoint(),
            req.resource_path(),
            req.parameters()
        );
        req.add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("KEY {}", cred.access_key_id))?,
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let adapter = default_adapter(
        "execute-api",
        KeyOnlySigner,
        StaticCredentialProvider::new("access_key_id", "secret_access_key"),
    )?;
    let client = default_client(adapter);

    let url = format!("{INVOKE_URL}/some/path?and=param");
    let resp = client.get(&url).send().await?;
    println!("GET {url}: {}", resp.status());

    Ok(())
}
