//! Host process port

/// Signal sink for the process hosting the wallet application
///
/// Fired once after the node has applied a software update; the host is
/// expected to terminate so it can be restarted on the new version.
pub trait HostProcess: Send + Sync {
    fn request_restart(&self);
}
