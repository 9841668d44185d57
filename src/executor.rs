//! Bounded-concurrency batch execution.
//!
//! Descriptors are split into consecutive chunks of at most `batch_size`.
//! Chunks run strictly one after another; inside a chunk every request is
//! in flight at once, multiplexed on the calling task. Whatever a single
//! request does (error status, transport failure, timeout, even a panic in
//! the client future) it resolves to a [`CompletedCall`], so one failure
//! never cuts a chunk or the run short.
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::context::{CallContext, CallOutcome, CompletedCall, RunCounters};
use crate::plan::RequestDescriptor;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Receives each call as soon as it completes.
pub trait CompletionSink {
    fn record(&mut self, call: &CompletedCall);
}

pub struct BatchExecutor<'run, C: ?Sized> {
    client: &'run C,
    session_id: Arc<str>,
    counters: &'run RunCounters,
    batch_size: NonZeroUsize,
    request_timeout: Duration,
}

impl<'run, C> BatchExecutor<'run, C>
where
    C: ApiClient + ?Sized,
{
    #[must_use]
    pub const fn new(
        client: &'run C,
        session_id: Arc<str>,
        counters: &'run RunCounters,
        batch_size: NonZeroUsize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            session_id,
            counters,
            batch_size,
            request_timeout,
        }
    }

    /// Runs `descriptors` chunk by chunk and returns the completed calls in
    /// descriptor order. `sink` sees completions as they happen, so within a
    /// chunk its order may differ from the returned order.
    pub async fn run<S>(
        &self,
        descriptors: Vec<RequestDescriptor>,
        sink: &mut S,
    ) -> Vec<CompletedCall>
    where
        S: CompletionSink + ?Sized,
    {
        let mut completed = Vec::with_capacity(descriptors.len());
        for (chunk_index, chunk) in descriptors.chunks(self.batch_size.get()).enumerate() {
            debug!(chunk = chunk_index, size = chunk.len(), "Dispatching chunk");
            let calls = self.run_chunk(chunk, sink).await;
            completed.extend(calls);
        }
        completed
    }

    async fn run_chunk<S>(&self, chunk: &[RequestDescriptor], sink: &mut S) -> Vec<CompletedCall>
    where
        S: CompletionSink + ?Sized,
    {
        let mut in_flight = FuturesUnordered::new();
        for (position, descriptor) in chunk.iter().enumerate() {
            let context = descriptor.start(Arc::clone(&self.session_id));
            self.counters.record_created();
            in_flight.push(self.dispatch(position, descriptor, context));
        }

        let mut slots: Vec<Option<CompletedCall>> = vec![None; chunk.len()];
        while let Some((position, call)) = in_flight.next().await {
            sink.record(&call);
            if let Some(slot) = slots.get_mut(position) {
                *slot = Some(call);
            }
        }
        slots.into_iter().flatten().collect()
    }

    async fn dispatch(
        &self,
        position: usize,
        descriptor: &RequestDescriptor,
        context: CallContext,
    ) -> (usize, CompletedCall) {
        let outcome = {
            let call = AssertUnwindSafe(descriptor.invoke(self.client, &context)).catch_unwind();
            match tokio::time::timeout(self.request_timeout, call).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_panic)) => {
                    warn!(
                        correlation_id = context.correlation_id(),
                        "API client panicked; recording as failed call"
                    );
                    CallOutcome::transport("client panicked while handling request".to_owned())
                }
                Err(_elapsed) => CallOutcome::timed_out(self.request_timeout),
            }
        };
        (position, context.complete(outcome))
    }
}
