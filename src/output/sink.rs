//! Row sinks

use crate::error::{Error, Result};
use crate::extract::Row;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Destination of extracted rows
///
/// `send` may wait for the consumer; callers race it against cancellation.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Hand one row to the sink
    async fn send(&self, row: Row) -> Result<()>;
}

/// Sink backed by a bounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Row>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Row>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Wrap an existing sender
    pub fn new(tx: mpsc::Sender<Row>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RowSink for ChannelSink {
    async fn send(&self, row: Row) -> Result<()> {
        self.tx
            .send(row)
            .await
            .map_err(|_| Error::output("row receiver was dropped"))
    }
}
