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

//! Replayable request content exposed to signers.

use std::cmp::min;
use std::fmt::{Debug, Formatter};
use std::io::{self, Cursor, Read};

use bytes::Bytes;

use crate::constants::DEFAULT_READ_LIMIT;
use crate::{Body, BodyStream};

/// How many bytes of a streamed content can be read and still be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimitInfo {
    read_limit: usize,
}

impl ReadLimitInfo {
    /// Create a new read limit.
    pub fn new(read_limit: usize) -> Self {
        Self { read_limit }
    }

    /// The read limit in bytes.
    pub fn read_limit(&self) -> usize {
        self.read_limit
    }
}

impl Default for ReadLimitInfo {
    fn default() -> Self {
        Self::new(DEFAULT_READ_LIMIT)
    }
}

/// Request content as seen by a signer.
///
/// `Content` implements [`Read`] and can be rewound with [`Content::reset`].
/// In-memory content can always be rewound. Streamed content is buffered
/// while it's read: up to the read limit the consumed prefix is kept so the
/// stream can be reset and later replayed by the HTTP client. Once more than
/// the read limit has been read, the prefix is dropped and reset fails.
pub struct Content {
    source: Source,
    pos: usize,
}

enum Source {
    Bytes(Bytes),
    Stream(StreamState),
}

struct StreamState {
    stream: BodyStream,
    buf: Vec<u8>,
    pulled: u64,
    eof: bool,
    overflowed: bool,
    read_limit: usize,
}

impl Content {
    /// Create content from in-memory bytes.
    pub fn from_bytes(bs: impl Into<Bytes>) -> Self {
        Self {
            source: Source::Bytes(bs.into()),
            pos: 0,
        }
    }

    /// Create content from a blocking reader using the default read limit.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self::from_stream(BodyStream::new(reader), ReadLimitInfo::default())
    }

    /// Create content from a body stream, buffering at most
    /// `limit.read_limit()` bytes for replay.
    pub fn from_stream(stream: BodyStream, limit: ReadLimitInfo) -> Self {
        Self {
            source: Source::Stream(StreamState {
                stream,
                buf: Vec::new(),
                pulled: 0,
                eof: false,
                overflowed: false,
                read_limit: limit.read_limit(),
            }),
            pos: 0,
        }
    }

    /// Declared length of the content, `None` if a stream doesn't know it.
    pub fn content_length(&self) -> Option<u64> {
        match &self.source {
            Source::Bytes(bs) => Some(bs.len() as u64),
            Source::Stream(s) if s.eof && !s.overflowed => Some(s.buf.len() as u64),
            Source::Stream(s) => s.stream.content_length(),
        }
    }

    /// Returns the whole content if it's entirely held in memory.
    ///
    /// This ignores the read cursor. Streams return `None` until they have
    /// been read to the end within the read limit.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.source {
            Source::Bytes(bs) => Some(bs.as_ref()),
            Source::Stream(s) if s.eof && !s.overflowed => Some(s.buf.as_slice()),
            Source::Stream(_) => None,
        }
    }

    /// Rewind the content to its first byte.
    pub fn reset(&mut self) -> io::Result<()> {
        if let Source::Stream(s) = &self.source {
            if s.overflowed {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!(
                        "content cannot be reset: more than {} bytes have been read",
                        s.read_limit
                    ),
                ));
            }
        }
        self.pos = 0;
        Ok(())
    }

    /// Check if any byte has been pulled out of the underlying stream.
    pub(crate) fn is_consumed(&self) -> bool {
        match &self.source {
            Source::Bytes(_) => false,
            Source::Stream(s) => s.pulled > 0,
        }
    }

    /// Read the complete content into memory, regardless of the cursor.
    pub fn into_bytes(self) -> io::Result<Bytes> {
        match self.source {
            Source::Bytes(bs) => Ok(bs),
            Source::Stream(mut s) => {
                if s.overflowed {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        "content cannot be buffered: the read prefix exceeded the read limit",
                    ));
                }
                if !s.eof {
                    s.stream.read_to_end(&mut s.buf)?;
                }
                Ok(s.buf.into())
            }
        }
    }

    /// Turn the content back into a native body that starts at its first byte.
    ///
    /// An untouched stream is returned as is. A partially read stream is
    /// replayed from the buffered prefix followed by the unread remainder.
    pub(crate) fn into_body(self) -> io::Result<Body> {
        match self.source {
            Source::Bytes(bs) => Ok(Body::Bytes(bs)),
            Source::Stream(s) if s.pulled == 0 => Ok(Body::Stream(s.stream)),
            Source::Stream(s) if s.overflowed => Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "content cannot be replayed: more than {} bytes have been read",
                    s.read_limit
                ),
            )),
            Source::Stream(s) if s.eof => Ok(Body::Bytes(s.buf.into())),
            Source::Stream(s) => {
                let length = s.stream.content_length;
                let replay = BodyStream {
                    reader: Box::new(Cursor::new(s.buf).chain(s.stream)),
                    content_length: length,
                };
                Ok(Body::Stream(replay))
            }
        }
    }
}

impl Read for Content {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match &mut self.source {
            Source::Bytes(bs) => {
                let remaining = &bs[min(self.pos, bs.len())..];
                let n = min(remaining.len(), out.len());
                out[..n].copy_from_slice(&remaining[..n]);
                self.pos += n;
                Ok(n)
            }
            Source::Stream(s) => {
                if !s.overflowed && self.pos < s.buf.len() {
                    let remaining = &s.buf[self.pos..];
                    let n = min(remaining.len(), out.len());
                    out[..n].copy_from_slice(&remaining[..n]);
                    self.pos += n;
                    return Ok(n);
                }
                if s.eof || out.is_empty() {
                    return Ok(0);
                }

                let n = s.stream.read(out)?;
                if n == 0 {
                    s.eof = true;
                    return Ok(0);
                }
                s.pulled += n as u64;
                self.pos += n;
                if !s.overflowed {
                    if s.buf.len() + n <= s.read_limit {
                        s.buf.extend_from_slice(&out[..n]);
                    } else {
                        s.overflowed = true;
                        s.buf = Vec::new();
                    }
                }
                Ok(n)
            }
        }
    }
}

impl Debug for Content {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Bytes(bs) => f
                .debug_struct("Content")
                .field("len", &bs.len())
                .field("pos", &self.pos)
                .finish(),
            Source::Stream(s) => f
                .debug_struct("Content")
                .field("stream", &s.stream)
                .field("buffered", &s.buf.len())
                .field("pos", &self.pos)
                .field("eof", &s.eof)
                .finish(),
        }
    }
}

impl From<Bytes> for Content {
    fn from(bs: Bytes) -> Self {
        Content::from_bytes(bs)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bs: Vec<u8>) -> Self {
        Content::from_bytes(bs)
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::from_bytes(s)
    }
}

impl From<&'static str> for Content {
    fn from(s: &'static str) -> Self {
        Content::from_bytes(Bytes::from_static(s.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read_all(c: &mut Content) -> Vec<u8> {
        let mut buf = Vec::new();
        c.read_to_end(&mut buf).expect("read must succeed");
        buf
    }

    #[test]
    fn test_bytes_content_reset() {
        let mut c = Content::from("I'm an entity");
        assert_eq!(read_all(&mut c), b"I'm an entity");
        assert_eq!(read_all(&mut c), b"");
        c.reset().unwrap();
        assert_eq!(read_all(&mut c), b"I'm an entity");
        assert_eq!(c.as_bytes(), Some(&b"I'm an entity"[..]));
    }

    #[test]
    fn test_stream_content_buffers_on_demand() {
        let mut c = Content::from_reader(Cursor::new(b"streamed body".to_vec()));
        assert_eq!(c.as_bytes(), None);
        assert_eq!(c.content_length(), None);

        let mut head = [0u8; 8];
        c.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"streamed");
        c.reset().unwrap();

        assert_eq!(read_all(&mut c), b"streamed body");
        assert_eq!(c.as_bytes(), Some(&b"streamed body"[..]));
        assert_eq!(c.content_length(), Some(13));
    }

    #[test]
    fn test_stream_content_reset_fails_beyond_read_limit() {
        let data = vec![7u8; 64];
        let mut c = Content::from_stream(
            BodyStream::new(Cursor::new(data.clone())),
            ReadLimitInfo::new(16),
        );
        assert_eq!(read_all(&mut c), data);
        assert!(c.reset().is_err());
        assert!(c.into_body().is_err());
    }

    #[test]
    fn test_partially_read_stream_is_replayed() {
        let mut c = Content::from_reader(Cursor::new(b"hello world".to_vec()));
        let mut head = [0u8; 5];
        c.read_exact(&mut head).unwrap();
        assert!(c.is_consumed());

        let body = c.into_body().unwrap();
        assert!(body.is_stream());
        assert_eq!(&body.into_bytes().unwrap()[..], b"hello world");
    }

    #[test]
    fn test_untouched_stream_is_returned() {
        let c = Content::from_stream(
            BodyStream::new(Cursor::new(b"abc".to_vec())).with_content_length(3),
            ReadLimitInfo::default(),
        );
        assert!(!c.is_consumed());
        let body = c.into_body().unwrap();
        assert_eq!(body.content_length(), Some(3));
        assert_eq!(&body.into_bytes().unwrap()[..], b"abc");
    }

    #[test]
    fn test_into_bytes_reads_remaining_stream() {
        let mut c = Content::from_reader(Cursor::new(b"new content".to_vec()));
        let mut head = [0u8; 3];
        c.read_exact(&mut head).unwrap();
        assert_eq!(&c.into_bytes().unwrap()[..], b"new content");
    }
}
