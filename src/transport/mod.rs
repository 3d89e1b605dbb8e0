//! Frame transports. A transport moves opaque byte frames; message encoding
//! lives in [`crate::protocol`].

use alloc::boxed::Box;
use alloc::vec::Vec;

#[async_trait::async_trait]
pub trait Transport: Send {
    /// Deliver one frame to the remote end.
    async fn send(&mut self, frame: Vec<u8>) -> anyhow::Result<()>;

    /// Next frame, or `Ok(None)` once the remote end closed cleanly.
    ///
    /// Implementations must be cancel-safe: dropping the future loses no data.
    async fn recv(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

#[async_trait::async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&mut self, frame: Vec<u8>) -> anyhow::Result<()> {
        (**self).send(frame).await
    }

    async fn recv(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        (**self).recv().await
    }
}

pub mod channel;
pub mod in_memory;
pub mod tcp;
