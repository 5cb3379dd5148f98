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

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};

use crate::{Content, Endpoint, OriginalRequest, Parameters, ReadLimitInfo, SignableRequest};

/// ContentChangeTracker wraps a [`SignableRequest`] and remembers whether
/// the content has been replaced.
///
/// Every call is forwarded to the wrapped request. Only
/// [`SignableRequest::set_content`] flips the flag, and it stays set.
#[derive(Debug)]
pub struct ContentChangeTracker<'a, R: SignableRequest + ?Sized> {
    original: &'a mut R,
    content_changed: bool,
}

impl<'a, R: SignableRequest + ?Sized> ContentChangeTracker<'a, R> {
    /// Start tracking the given request.
    pub fn new(original: &'a mut R) -> Self {
        Self {
            original,
            content_changed: false,
        }
    }

    /// Check if the content has been set since tracking started.
    pub fn is_content_changed(&self) -> bool {
        self.content_changed
    }
}

impl<R: SignableRequest + ?Sized> SignableRequest for ContentChangeTracker<'_, R> {
    fn service_name(&self) -> &str {
        self.original.service_name()
    }

    fn method(&self) -> &Method {
        self.original.method()
    }

    fn endpoint(&self) -> &Endpoint {
        self.original.endpoint()
    }

    fn resource_path(&self) -> &str {
        self.original.resource_path()
    }

    fn parameters(&self) -> &Parameters {
        self.original.parameters()
    }

    fn headers(&self) -> &HeaderMap {
        self.original.headers()
    }

    fn time_offset(&self) -> i64 {
        self.original.time_offset()
    }

    fn content(&mut self) -> Option<&mut Content> {
        self.original.content()
    }

    fn content_unwrapped(&self) -> Option<&[u8]> {
        self.original.content_unwrapped()
    }

    fn read_limit_info(&self) -> ReadLimitInfo {
        self.original.read_limit_info()
    }

    fn original_request(&self) -> &OriginalRequest {
        self.original.original_request()
    }

    fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.original.add_header(name, value)
    }

    fn add_parameter(&mut self, name: &str, value: &str) {
        self.original.add_parameter(name, value)
    }

    fn set_content(&mut self, content: Content) {
        self.content_changed = true;
        self.original.set_content(content)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::{Body, Config, SigningRequest};
    use http::Request;
    use pretty_assertions::assert_eq;

    fn view() -> SigningRequest {
        let req = Request::post("http://localhost:9200/index/_doc?refresh=true")
            .header("content-type", "application/json")
            .body(Body::Empty)
            .unwrap();
        SigningRequest::build(&Config::new("es"), &req, None)
            .unwrap()
            .with_content(Some(Content::from("I'm an entity")))
    }

    #[test]
    fn test_reads_do_not_change_flag() {
        let mut view = view();
        let mut tracker = ContentChangeTracker::new(&mut view);

        assert_eq!(tracker.service_name(), "es");
        assert_eq!(tracker.method(), Method::POST);
        assert_eq!(tracker.endpoint().to_string(), "http://localhost:9200");
        assert_eq!(tracker.resource_path(), "/index/_doc");
        assert_eq!(tracker.parameters()["refresh"], vec!["true"]);
        assert_eq!(tracker.headers()["content-type"], "application/json");
        assert_eq!(tracker.time_offset(), 0);
        assert_eq!(tracker.read_limit_info(), ReadLimitInfo::default());
        assert_eq!(tracker.original_request().method, Method::POST);
        assert_eq!(tracker.content_unwrapped(), Some(&b"I'm an entity"[..]));

        let mut buf = String::new();
        tracker
            .content()
            .expect("content must exist")
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "I'm an entity");

        assert!(!tracker.is_content_changed());
    }

    #[test]
    fn test_non_content_mutations_do_not_change_flag() {
        let mut view = view();
        let mut tracker = ContentChangeTracker::new(&mut view);

        tracker.add_header(
            HeaderName::from_static("signature"),
            HeaderValue::from_static("wuzzle"),
        );
        tracker.add_parameter("X-Amz-Expires", "300");
        assert!(!tracker.is_content_changed());

        drop(tracker);
        assert_eq!(view.headers()["signature"], "wuzzle");
        assert_eq!(view.parameters()["X-Amz-Expires"], vec!["300"]);
    }

    #[test]
    fn test_set_content_is_sticky() {
        let mut view = view();
        let mut tracker = ContentChangeTracker::new(&mut view);

        tracker.set_content(Content::from("new content"));
        assert!(tracker.is_content_changed());
        assert_eq!(tracker.content_unwrapped(), Some(&b"new content"[..]));

        tracker.set_content(Content::from("I'm an entity"));
        tracker.add_header(
            HeaderName::from_static("signature"),
            HeaderValue::from_static("wuzzle"),
        );
        assert!(tracker.is_content_changed());

        drop(tracker);
        assert_eq!(view.content_unwrapped(), Some(&b"I'm an entity"[..]));
    }

    #[test]
    fn test_wraps_trait_object() {
        let mut view = view();
        let inner: &mut dyn SignableRequest = &mut view;
        let mut tracker = ContentChangeTracker::new(inner);
        tracker.set_content(Content::from("x"));
        assert!(tracker.is_content_changed());
    }
}
