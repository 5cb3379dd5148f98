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

use reqsign_interceptor_core::{
    Config, OsEnv, ProvideCredential, RequestAdapter, Result, SignRequest, SigningCredential,
};

/// Create an adapter for given service, with config values found in the
/// process env taking precedence.
///
/// See [`Config`] for the env values read.
pub fn default_adapter<K: SigningCredential>(
    service: &str,
    signer: impl SignRequest<Credential = K>,
    provider: impl ProvideCredential<Credential = K>,
) -> Result<RequestAdapter<K>> {
    let config = Config::new(service).from_env(&OsEnv)?;
    Ok(RequestAdapter::with_config(config, signer, provider))
}

/// Create a reqwest client that signs every request with given adapter.
#[cfg(feature = "reqwest")]
pub fn default_client<K: SigningCredential>(
    adapter: RequestAdapter<K>,
) -> reqwest_middleware::ClientWithMiddleware {
    log::debug!("building signing client for service {:?}", adapter.config().service);

    reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
        .with(reqsign_interceptor_reqwest::SigningMiddleware::new(adapter))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqsign_interceptor_core::{Credential, SignableRequest, StaticCredentialProvider};

    #[derive(Debug)]
    struct NoopSigner;

    impl SignRequest for NoopSigner {
        type Credential = Credential;

        fn sign_request(&self, _: &mut dyn SignableRequest, _: &Credential) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_adapter() {
        let adapter = default_adapter("es", NoopSigner, StaticCredentialProvider::new("ak", "sk"))
            .expect("default adapter must build");
        assert_eq!(adapter.config().service, "es");
        assert!(adapter.config().read_limit > 0);
    }
}
