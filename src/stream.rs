//! Frame acquisition from a byte stream (capture file, serial device node, stdin).
//!
//! Frames carry no length prefix, so [`FrameReader`] counts bytes. When a frame is
//! rejected because a marker is missing, the stream has gained or lost bytes;
//! [`FrameReader::resync`] scans the rejected bytes for the next header so that the
//! following frames line up again. [`Records`] drives the reader and applies the
//! caller's [`RejectPolicy`].

use crate::codec::{DecodeError, FieldDecoder};
use crate::frame::{decode_frame, diagnose_frame, DecodedRecord};
use crate::schema::Schema;
use std::io::{self, Read};

/// Errors that end a read loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("input ended after {filled} of {expected} frame bytes")]
    PartialFrame { filled: usize, expected: usize },
    #[error("frame {frame} rejected: {source}")]
    Rejected {
        frame: u64,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads whole frames of the schema's length.
pub struct FrameReader<R> {
    inner: R,
    frame_len: usize,
    /// Header marker as frame bytes; `None` if it cannot occur in a byte stream.
    header: Option<Vec<u8>>,
    /// Start of the next frame, carried over by [`FrameReader::resync`].
    pending: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, schema: &Schema) -> Self {
        let header = match &schema.header().decoder {
            FieldDecoder::Marker { literal } => literal
                .chars()
                .map(|c| u8::try_from(c).ok())
                .collect::<Option<Vec<u8>>>()
                .filter(|h| !h.is_empty()),
            _ => None,
        };
        FrameReader {
            inner,
            frame_len: schema.frame_len(),
            header,
            pending: Vec::new(),
        }
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill one frame. `Ok(None)` on a clean end of input (no byte of a new frame
    /// read); input ending mid-frame is [`StreamError::PartialFrame`].
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let mut buf = std::mem::take(&mut self.pending);
        let mut filled = buf.len();
        buf.resize(self.frame_len, 0);
        while filled < self.frame_len {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(StreamError::PartialFrame {
                        filled,
                        expected: self.frame_len,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    buf.truncate(filled);
                    self.pending = buf;
                    return Err(e.into());
                }
            }
        }
        Ok(Some(buf))
    }

    /// Realign after `rejected` (the frame just returned by [`next_frame`](Self::next_frame))
    /// failed its marker checks. The bytes from the next header occurrence on, or a
    /// partial header at the very end, start the next frame. Returns the number of
    /// bytes dropped.
    pub fn resync(&mut self, rejected: &[u8]) -> usize {
        let drop = match &self.header {
            Some(h) => header_offset(rejected, h),
            None => rejected.len(),
        };
        self.pending = rejected[drop..].to_vec();
        drop
    }
}

/// First offset past 0 where `buf` continues with `header` (or with a prefix of it,
/// when `buf` ends first). `buf.len()` if there is none.
fn header_offset(buf: &[u8], header: &[u8]) -> usize {
    (1..buf.len())
        .find(|&p| {
            let tail = &buf[p..];
            let n = tail.len().min(header.len());
            tail[..n] == header[..n]
        })
        .unwrap_or(buf.len())
}

/// What to do with a frame that fails validation or decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Log it and continue with the next frame.
    Skip,
    /// Yield [`StreamError::Rejected`] and stop.
    Stop,
}

/// Counters for one read loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames read, decoded or not.
    pub frames: u64,
    pub decoded: u64,
    pub rejected: u64,
    /// Bytes discarded while realigning on the header.
    pub resync_bytes: u64,
    /// Bytes of a trailing incomplete frame, if input ended inside one.
    pub partial_bytes: Option<usize>,
}

/// Iterator over decoded records of a byte stream.
///
/// Ends on a clean end of input, after `max_frames` frames, on a trailing partial frame
/// (logged, see [`StreamStats::partial_bytes`]), or after yielding an error.
pub struct Records<'a, R> {
    reader: FrameReader<R>,
    schema: &'a Schema,
    policy: RejectPolicy,
    max_frames: Option<u64>,
    stats: StreamStats,
    done: bool,
}

impl<'a, R: Read> Records<'a, R> {
    pub fn new(inner: R, schema: &'a Schema, policy: RejectPolicy) -> Self {
        Records {
            reader: FrameReader::new(inner, schema),
            schema,
            policy,
            max_frames: None,
            stats: StreamStats::default(),
            done: false,
        }
    }

    /// Stop after this many frames, rejected ones included.
    pub fn max_frames(mut self, max: Option<u64>) -> Self {
        self.max_frames = max;
        self
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    fn reject(&mut self, frame: u64, bytes: &[u8], e: &DecodeError) {
        self.stats.rejected += 1;
        tracing::warn!(frame, error = %e, "frame rejected");
        for problem in diagnose_frame(self.schema, bytes) {
            tracing::debug!(frame, "  {}", problem);
        }
        if e.is_structural() {
            let dropped = self.reader.resync(bytes);
            self.stats.resync_bytes += dropped as u64;
            tracing::debug!(frame, dropped, "realigned on header");
        }
    }
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<DecodedRecord, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.max_frames.is_some_and(|max| self.stats.frames >= max) {
                break;
            }
            let bytes = match self.reader.next_frame() {
                Ok(Some(b)) => b,
                Ok(None) => break,
                Err(StreamError::PartialFrame { filled, expected }) => {
                    tracing::warn!(filled, expected, "input ended inside a frame");
                    self.stats.partial_bytes = Some(filled);
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.stats.frames += 1;
            let frame = self.stats.frames;
            match decode_frame(self.schema, &bytes) {
                Ok(record) => {
                    self.stats.decoded += 1;
                    return Some(Ok(record));
                }
                Err(e) => {
                    self.reject(frame, &bytes, &e);
                    if self.policy == RejectPolicy::Stop {
                        self.done = true;
                        return Some(Err(StreamError::Rejected { frame, source: e }));
                    }
                }
            }
        }
        self.done = true;
        None
    }
}
