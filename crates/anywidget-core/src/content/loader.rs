//! The content loader contract.

use super::{Capabilities, ContentNode, ContentResult};
use std::future::Future;
use std::pin::Pin;

/// Boxed future for content loads. Not `Send`: loads run on the host's
/// event-loop thread.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Produces a widget's content tree from its source text.
///
/// A loader only reaches the outside world through the [`Capabilities`] it is
/// handed. The returned future is polled from the host tick; an error (or a
/// panic) becomes a placeholder in the widget, never a host failure.
pub trait ContentLoader {
    fn load(&self, source: String, capabilities: Capabilities) -> BoxFuture<'static, ContentResult<ContentNode>>;
}
