//! Pass-through stream adapter
//!
//! Wraps a vendor byte stream, yields every item unchanged to the caller and
//! feeds a [`StreamAggregator`] on the side. When the inner stream ends the
//! outcome is sent on a oneshot channel.

use super::aggregator::{StreamAggregator, StreamOutcome};
use super::decoder::ChunkDecoder;
use crate::core::handlers::Handler;
use crate::core::types::ApiRequest;
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

pin_project! {
    /// A byte stream that aggregates usage while it is consumed
    pub struct AggregatingStream<S> {
        #[pin]
        inner: S,
        decoder: ChunkDecoder,
        aggregator: Option<StreamAggregator>,
        request: ApiRequest,
        outcome_tx: Option<oneshot::Sender<StreamOutcome>>,
    }
}

impl<S> AggregatingStream<S> {
    /// Wrap `inner`. Returns `None` when the handler does not stream.
    pub fn new(
        inner: S,
        handler: Arc<dyn Handler>,
        request: ApiRequest,
    ) -> Option<(Self, oneshot::Receiver<StreamOutcome>)> {
        let framing = handler.stream_merger()?.framing();
        let aggregator = StreamAggregator::new(handler)?;
        let (tx, rx) = oneshot::channel();
        Some((
            Self {
                inner,
                decoder: ChunkDecoder::new(framing),
                aggregator: Some(aggregator),
                request,
                outcome_tx: Some(tx),
            },
            rx,
        ))
    }
}

impl<S, E> Stream for AggregatingStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(bytes))) => {
                if let Some(aggregator) = this.aggregator.as_mut() {
                    for payload in this.decoder.feed(&bytes) {
                        aggregator.push_raw(&payload);
                    }
                }
                Poll::Ready(Some(Ok(bytes)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                if let Some(mut aggregator) = this.aggregator.take() {
                    if let Some(payload) = this.decoder.finish() {
                        aggregator.push_raw(&payload);
                    }
                    let outcome = aggregator.finish(this.request);
                    if let Some(tx) = this.outcome_tx.take() {
                        if tx.send(outcome).is_err() {
                            debug!("stream outcome receiver dropped");
                        }
                    }
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
