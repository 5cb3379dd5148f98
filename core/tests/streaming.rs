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

use std::io::Cursor;
use std::sync::atomic::Ordering;

use http::Request;
use pretty_assertions::assert_eq;
use reqsign_interceptor_core::{
    Body, Config, ErrorKind, InterceptContext, RequestAdapter, StaticCredentialProvider,
};

use super::signers::{
    sha256_hex, AddHeaderSigner, CountingReader, FailingSigner, HashingSigner,
    ReplaceContentSigner,
};
use super::{adapter, init};

fn read_body(req: &mut Request<Body>) -> Vec<u8> {
    let body = std::mem::take(req.body_mut());
    body.into_bytes().expect("body must be readable").to_vec()
}

#[test]
fn test_untouched_stream_is_not_read() {
    let (reader, read) = CountingReader::new(&[0, 1]);
    let mut req = Request::get("http://localhost/query?a=b")
        .header("content-encoding", "gzip")
        .body(Body::from_reader_with_length(reader, 2))
        .unwrap();

    let outcome = adapter(AddHeaderSigner::new("Signature", "wuzzle"))
        .intercept(&mut req, &InterceptContext::new())
        .unwrap();

    assert!(!outcome.content_changed);
    assert_eq!(read.load(Ordering::SeqCst), 0);
    assert!(req.body().is_stream());
    assert_eq!(req.body().content_length(), Some(2));
    assert_eq!(req.headers()["content-encoding"], "gzip");
    assert_eq!(read_body(&mut req), vec![0, 1]);
}

#[test]
fn test_hashed_stream_is_replayed() {
    let data = b"{\"query\":{\"match_all\":{}}}";
    let mut req = Request::post("http://localhost:9200/_search")
        .body(Body::from_reader(Cursor::new(data.to_vec())))
        .unwrap();

    let outcome = adapter(HashingSigner)
        .intercept(&mut req, &InterceptContext::new())
        .unwrap();

    assert!(!outcome.content_changed);
    assert_eq!(
        req.headers()["x-amz-content-sha256"],
        sha256_hex(data).as_str()
    );
    assert_eq!(read_body(&mut req), data.to_vec());
}

#[test]
fn test_stream_beyond_read_limit_fails() {
    init();
    let data = vec![b'x'; 64];
    let adapter = RequestAdapter::with_config(
        Config::new("es").with_read_limit(16),
        HashingSigner,
        StaticCredentialProvider::new("access_key_id", "secret_access_key"),
    );
    let mut req = Request::put("http://localhost/blob")
        .body(Body::from_reader(Cursor::new(data)))
        .unwrap();

    // The signer can't rewind a stream it read past the limit.
    let err = adapter
        .intercept(&mut req, &InterceptContext::new())
        .expect_err("reset must fail");
    assert_eq!(err.kind(), ErrorKind::ContentInvalid);
    assert!(req.headers().get("x-amz-content-sha256").is_none());
}

#[test]
fn test_replace_stream_content() {
    let (reader, read) = CountingReader::new(b"I'm an entity");
    let mut req = Request::post("http://localhost/query")
        .header("content-type", "text/plain")
        .body(Body::from_reader(reader))
        .unwrap();

    let outcome = adapter(ReplaceContentSigner("new content"))
        .intercept(&mut req, &InterceptContext::new())
        .unwrap();

    assert!(outcome.content_changed);
    assert_eq!(read.load(Ordering::SeqCst), 0);
    assert!(!req.body().is_stream());
    assert_eq!(req.headers()["content-type"], "text/plain");
    assert_eq!(read_body(&mut req), b"new content".to_vec());
}

#[test]
fn test_failed_signing_restores_stream() {
    let (reader, read) = CountingReader::new(b"I'm an entity");
    let mut req = Request::post("http://localhost/query")
        .body(Body::from_reader(reader))
        .unwrap();

    adapter(FailingSigner)
        .intercept(&mut req, &InterceptContext::new())
        .expect_err("signer error must propagate");

    assert_eq!(read.load(Ordering::SeqCst), 0);
    assert!(req.body().is_stream());
    assert_eq!(read_body(&mut req), b"I'm an entity".to_vec());
}
