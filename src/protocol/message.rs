//! Wire message tags and encoding helpers.
//!
//! Every frame starts with a two digit decimal type tag followed by the
//! message body, usually JSON.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// Protocol message types.
///
/// Post model messages count up from 1, control messages start at 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    InsertThread = 1,
    InsertPost,
    Append,
    Backspace,
    Splice,
    ClosePost,
    InsertImage,
    Spoiler,
    DeletePost,
    Banned,
    DeleteImage,
    MeidoVision,
    LockThread,
    PurgePost,

    /// Full thread snapshot or legacy sync summary
    Synchronise = 30,
    Reclaim,
    SwitchSync,
    /// Several messages joined into one frame
    Concat,
    Noop,
    /// Unique IP count of a feed
    SyncCount,
    ServerTime,
}

impl MessageType {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The two ASCII digits written at the start of a frame.
    #[inline]
    pub const fn tag(self) -> [u8; 2] {
        let code = self.code();
        [b'0' + code / 10, b'0' + code % 10]
    }

    pub fn from_code(code: u8) -> Option<Self> {
        use MessageType::*;
        let typ = match code {
            1 => InsertThread,
            2 => InsertPost,
            3 => Append,
            4 => Backspace,
            5 => Splice,
            6 => ClosePost,
            7 => InsertImage,
            8 => Spoiler,
            9 => DeletePost,
            10 => Banned,
            11 => DeleteImage,
            12 => MeidoVision,
            13 => LockThread,
            14 => PurgePost,
            30 => Synchronise,
            31 => Reclaim,
            32 => SwitchSync,
            33 => Concat,
            34 => Noop,
            35 => SyncCount,
            36 => ServerTime,
            _ => return None,
        };
        Some(typ)
    }

    /// Read the type tag of an encoded frame.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        match frame {
            [a @ b'0'..=b'9', b @ b'0'..=b'9', ..] => Self::from_code((a - b'0') * 10 + (b - b'0')),
            _ => None,
        }
    }
}

/// Encode `msg` as JSON and prefix it with the type tag.
pub fn encode_message<T: Serialize + ?Sized>(
    typ: MessageType,
    msg: &T,
) -> serde_json::Result<Bytes> {
    let mut out = Vec::with_capacity(32);
    out.extend_from_slice(&typ.tag());
    serde_json::to_writer(&mut out, msg)?;
    Ok(Bytes::from(out))
}

/// Prefix an already encoded body with the type tag.
pub fn prepend_type(typ: MessageType, body: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(body.len() + 2);
    out.put_slice(&typ.tag());
    out.put_slice(body);
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_two_digits() {
        assert_eq!(&MessageType::InsertThread.tag(), b"01");
        assert_eq!(&MessageType::PurgePost.tag(), b"14");
        assert_eq!(&MessageType::Synchronise.tag(), b"30");
        assert_eq!(&MessageType::Concat.tag(), b"33");
        assert_eq!(&MessageType::SyncCount.tag(), b"35");
    }

    #[test]
    fn test_codes_resolve_back() {
        for code in 0..=99 {
            if let Some(typ) = MessageType::from_code(code) {
                assert_eq!(typ.code(), code);
            }
        }
        assert_eq!(MessageType::from_code(0), None);
        assert_eq!(MessageType::from_code(15), None);
    }

    #[test]
    fn test_encode_message() {
        let msg = encode_message(MessageType::SyncCount, &2).unwrap();
        assert_eq!(&msg[..], b"352");

        let msg = encode_message(MessageType::DeletePost, &17u64).unwrap();
        assert_eq!(&msg[..], b"0917");
        assert_eq!(MessageType::parse(&msg), Some(MessageType::DeletePost));
    }

    #[test]
    fn test_prepend_type() {
        let msg = prepend_type(MessageType::Synchronise, b"{}");
        assert_eq!(&msg[..], b"30{}");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(MessageType::parse(b""), None);
        assert_eq!(MessageType::parse(b"3"), None);
        assert_eq!(MessageType::parse(b"x1"), None);
        assert_eq!(MessageType::parse(b"99{}"), None);
    }
}
