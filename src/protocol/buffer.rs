//! Coalescing buffer for outgoing messages.
//!
//! Payloads written between two flushes leave as one frame:
//!
//! ```text
//! write(P)           -> "33" P
//! write(Q)           -> "33" P \0 Q
//! flush()            -> "33" P \0 Q     (2 payloads, concat frame)
//! write(P); flush()  -> P               (1 payload, sent as is)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::message::MessageType;

/// Separator between payloads of a concat frame.
pub const SEPARATOR: u8 = 0;

/// Accumulates payloads until the next flush.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    buf: BytesMut,
    count: usize,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one payload.
    pub fn write(&mut self, payload: &[u8]) {
        if self.count == 0 {
            self.buf.put_slice(&MessageType::Concat.tag());
        } else {
            self.buf.put_u8(SEPARATOR);
        }
        self.buf.put_slice(payload);
        self.count += 1;
    }

    /// Take the buffered frame, or `None` if nothing was written since the
    /// last flush.
    pub fn flush(&mut self) -> Option<Bytes> {
        let count = std::mem::take(&mut self.count);
        let mut frame = self.buf.split();
        match count {
            0 => None,
            1 => {
                frame.advance(2);
                Some(frame.freeze())
            }
            _ => Some(frame.freeze()),
        }
    }

    /// Number of payloads waiting for the next flush.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
