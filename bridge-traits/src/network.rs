//! Network Keepalive Abstraction
//!
//! A keepalive token prevents the host's network interface from suspending
//! while audio is streamed from a remote source. On platforms without such a
//! mechanism the implementation is a plain flag (see `bridge-desktop`).

/// Host handle to the network-keepalive resource.
///
/// `acquire`/`release` are idempotent: acquiring a held token or releasing
/// an idle one is a no-op.
pub trait NetworkKeepalive: Send + Sync {
    fn acquire(&self);

    fn release(&self);

    fn is_held(&self) -> bool;
}
