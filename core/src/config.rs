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

use log::debug;

use crate::constants::*;
use crate::{Env, Error, Result};

/// Config for the request adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `service` is the name of the target service, exposed to signers.
    ///
    /// - this field
    /// - env value: [`REQSIGN_INTERCEPTOR_SERVICE`]
    pub service: String,
    /// `time_offset` is the clock skew in seconds signers should apply.
    ///
    /// - this field
    /// - env value: [`REQSIGN_INTERCEPTOR_TIME_OFFSET`]
    /// - default to `0`
    pub time_offset: i64,
    /// `read_limit` is how many bytes of a streamed body can be replayed
    /// after a signer read them.
    ///
    /// - this field
    /// - env value: [`REQSIGN_INTERCEPTOR_READ_LIMIT`]
    /// - default to [`DEFAULT_READ_LIMIT`]
    pub read_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: String::new(),
            time_offset: 0,
            read_limit: DEFAULT_READ_LIMIT,
        }
    }
}

impl Config {
    /// Create a config for given service with default settings.
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            ..Default::default()
        }
    }

    /// Set the time offset in seconds.
    pub fn with_time_offset(mut self, seconds: i64) -> Self {
        self.time_offset = seconds;
        self
    }

    /// Set the read limit in bytes.
    pub fn with_read_limit(mut self, limit: usize) -> Self {
        self.read_limit = limit;
        self
    }

    /// Load config from env, values found in env override current ones.
    pub fn from_env(mut self, env: &impl Env) -> Result<Self> {
        if let Some(v) = env.var(REQSIGN_INTERCEPTOR_SERVICE) {
            self.service = v;
        }
        if let Some(v) = env.var(REQSIGN_INTERCEPTOR_TIME_OFFSET) {
            self.time_offset = v.trim().parse().map_err(|e| {
                Error::config_invalid(format!(
                    "{REQSIGN_INTERCEPTOR_TIME_OFFSET} must be an integer, got {v:?}"
                ))
                .with_source(e)
            })?;
        }
        if let Some(v) = env.var(REQSIGN_INTERCEPTOR_READ_LIMIT) {
            self.read_limit = v.trim().parse().map_err(|e| {
                Error::config_invalid(format!(
                    "{REQSIGN_INTERCEPTOR_READ_LIMIT} must be a byte count, got {v:?}"
                ))
                .with_source(e)
            })?;
        }

        debug!("loaded config from env: {self:?}");
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, StaticEnv};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_env() {
        let env = StaticEnv::from_pairs([
            (REQSIGN_INTERCEPTOR_SERVICE, "es"),
            (REQSIGN_INTERCEPTOR_TIME_OFFSET, "-30"),
            (REQSIGN_INTERCEPTOR_READ_LIMIT, "1024"),
        ]);

        let cfg = Config::default().from_env(&env).expect("must load");
        assert_eq!(
            cfg,
            Config {
                service: "es".to_string(),
                time_offset: -30,
                read_limit: 1024,
            }
        );
    }

    #[test]
    fn test_config_from_empty_env_keeps_values() {
        let cfg = Config::new("execute-api")
            .with_time_offset(5)
            .from_env(&StaticEnv::default())
            .expect("must load");
        assert_eq!(cfg.service, "execute-api");
        assert_eq!(cfg.time_offset, 5);
        assert_eq!(cfg.read_limit, DEFAULT_READ_LIMIT);
    }

    #[test]
    fn test_config_rejects_bad_read_limit() {
        let env = StaticEnv::from_pairs([(REQSIGN_INTERCEPTOR_READ_LIMIT, "lots")]);
        let err = Config::new("es").from_env(&env).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
