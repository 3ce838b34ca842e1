//! Connected client capability.
//!
//! The engine never owns a network connection. Transports implement
//! [`Client`] and hand the engine a [`ClientHandle`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::ops::Deref;
use std::sync::Arc;

use bytes::Bytes;

/// Flags read once when a client subscribes to a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Wants the full thread snapshot instead of the legacy summary
    pub new_protocol: bool,
    /// Only wants the opening post and the most recent replies
    pub last_n: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            new_protocol: true,
            last_n: false,
        }
    }
}

/// A connected client, as seen by the feeds.
///
/// `send` is called from inside feed loops and must not block.
pub trait Client: Send + Sync + 'static {
    fn send(&self, frame: Bytes);

    fn ip(&self) -> IpAddr;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

/// Shared client reference with identity semantics.
///
/// Two handles are equal only when they point at the same client.
#[derive(Clone)]
pub struct ClientHandle(Arc<dyn Client>);

impl ClientHandle {
    pub fn new(client: impl Client) -> Self {
        Self(Arc::new(client))
    }

    #[inline]
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl From<Arc<dyn Client>> for ClientHandle {
    fn from(client: Arc<dyn Client>) -> Self {
        Self(client)
    }
}

impl Deref for ClientHandle {
    type Target = dyn Client;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for ClientHandle {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ClientHandle {}

impl Hash for ClientHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("ip", &self.ip())
            .field("addr", &self.addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    struct Dummy;

    impl Client for Dummy {
        fn send(&self, _frame: Bytes) {}

        fn ip(&self) -> IpAddr {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }

    #[test]
    fn test_handle_identity() {
        let a = ClientHandle::new(Dummy);
        let b = ClientHandle::new(Dummy);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_capabilities() {
        let a = ClientHandle::new(Dummy);
        assert_eq!(
            a.capabilities(),
            Capabilities {
                new_protocol: true,
                last_n: false
            }
        );
    }
}
