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

use std::fmt::{Debug, Formatter};
use std::io::Read;

use bytes::Bytes;

/// Body of a native request handed to [`RequestAdapter`](crate::RequestAdapter).
///
/// `Bytes` bodies are already in memory and can be replayed any number of
/// times. `Stream` bodies are read lazily and may not know their size.
#[derive(Default)]
pub enum Body {
    /// No entity.
    #[default]
    Empty,
    /// Entity held in memory.
    Bytes(Bytes),
    /// Entity read from a blocking stream.
    Stream(BodyStream),
}

impl Body {
    /// Create a streamed body with unknown length.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Body::Stream(BodyStream::new(reader))
    }

    /// Create a streamed body with a declared length.
    pub fn from_reader_with_length(reader: impl Read + Send + 'static, length: u64) -> Self {
        Body::Stream(BodyStream::new(reader).with_content_length(length))
    }

    /// Declared length of this body, `None` if a stream doesn't know it.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(bs) => Some(bs.len() as u64),
            Body::Stream(s) => s.content_length,
        }
    }

    /// Returns the in-memory bytes of this body if it's not a stream.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bs) => Some(bs),
            _ => None,
        }
    }

    /// Check if this body is a stream.
    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    /// Read the whole body into memory.
    pub fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Bytes(bs) => Ok(bs),
            Body::Stream(mut s) => {
                let mut buf = Vec::with_capacity(s.content_length.unwrap_or(0) as usize);
                s.reader.read_to_end(&mut buf)?;
                Ok(buf.into())
            }
        }
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(bs) => write!(f, "Body::Bytes({} bytes)", bs.len()),
            Body::Stream(s) => s.fmt(f),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Body::Bytes(bs)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bs: Vec<u8>) -> Self {
        Body::Bytes(bs.into())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(s.into())
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bs: &'static [u8]) -> Self {
        Body::Bytes(Bytes::from_static(bs))
    }
}

/// A blocking reader used as request entity.
pub struct BodyStream {
    pub(crate) reader: Box<dyn Read + Send>,
    pub(crate) content_length: Option<u64>,
}

impl BodyStream {
    /// Wrap a reader whose length is unknown.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            content_length: None,
        }
    }

    /// Declare the length of this stream.
    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Declared length of this stream.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

impl Read for BodyStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Debug for BodyStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
