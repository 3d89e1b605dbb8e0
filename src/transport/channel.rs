//! Background pump that owns one transport.
//!
//! Each spawned channel forwards inbound frames into a shared event queue
//! tagged with its [`Source`], and writes frames queued on its handle.
//! Queued frames are flushed before the transport is dropped.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use crate::session::Source;
use crate::transport::Transport;

/// Activity on a channel, delivered to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Frame(Source, Vec<u8>),
    /// Channel ended; carries the error text unless the remote end closed cleanly.
    Closed(Source, Option<String>),
}

/// Write side of a spawned channel.
#[derive(Debug)]
pub struct ChannelHandle {
    source: Source,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub fn source(&self) -> Source {
        self.source
    }

    /// Queue a frame. Fails only once the channel has stopped.
    pub fn send(&self, frame: Vec<u8>) -> anyhow::Result<()> {
        self.outbound
            .send(frame)
            .map_err(|_| anyhow::anyhow!("{:?} channel closed", self.source))
    }

    /// Flush queued frames and close the transport, waiting at most `limit`.
    pub async fn shutdown(self, limit: Duration) {
        let ChannelHandle { source, outbound, mut task } = self;
        drop(outbound);
        if timeout(limit, &mut task).await.is_err() {
            log::warn!("{:?} channel did not flush within {:?}", source, limit);
            task.abort();
        }
    }
}

/// Spawn the pump for `transport` on the current runtime.
pub fn spawn_channel<T>(source: Source, transport: T, events: mpsc::UnboundedSender<ChannelEvent>) -> ChannelHandle
where
    T: Transport + 'static,
{
    let (outbound, mut queued) = mpsc::unbounded_channel::<Vec<u8>>();
    let task = tokio::spawn(async move {
        let mut transport = transport;
        let reason = loop {
            tokio::select! {
                biased;
                frame = queued.recv() => match frame {
                    Some(frame) => {
                        if let Err(e) = transport.send(frame).await {
                            break Some(e.to_string());
                        }
                    }
                    None => return,
                },
                inbound = transport.recv() => match inbound {
                    Ok(Some(frame)) => {
                        if events.send(ChannelEvent::Frame(source, frame)).is_err() {
                            return;
                        }
                    }
                    Ok(None) => break None,
                    Err(e) => break Some(e.to_string()),
                },
            }
        };
        log::debug!("{:?} channel closed: {:?}", source, reason);
        let _ = events.send(ChannelEvent::Closed(source, reason));
    });
    ChannelHandle { source, outbound, task }
}
