use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use super::{
    config::QueueConfig,
    dispatcher::Dispatcher,
    task_queue::{Shared, TaskQueue, Worker},
};
use crate::{
    events::{Bus, Event},
    handlers::SyncRef,
    keys::KeyFn,
    policies::{default_rate_limiter, RateLimiterRef},
    queue::DedupQueue,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for a [`TaskQueue`] and its [`Worker`].
pub struct TaskQueueBuilder<T> {
    cfg: QueueConfig,
    handler: SyncRef,
    key_fn: KeyFn<T>,
    limiter: Option<RateLimiterRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T> TaskQueueBuilder<T> {
    /// Creates a builder with an explicit key function.
    pub fn new(cfg: QueueConfig, handler: SyncRef, key_fn: KeyFn<T>) -> Self {
        Self {
            cfg,
            handler,
            key_fn,
            limiter: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the key function.
    pub fn with_key_fn(mut self, key_fn: KeyFn<T>) -> Self {
        self.key_fn = key_fn;
        self
    }

    /// Sets the retry rate limiter. Default: [`default_rate_limiter`].
    pub fn with_rate_limiter(mut self, limiter: RateLimiterRef) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive queue events through dedicated workers with
    /// bounded queues. `build` must then run inside a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the queue handle and its single worker.
    ///
    /// This consumes the builder and initializes:
    /// - the dedup queue with its rate limiter
    /// - the event bus
    /// - subscriber workers and the bus listener (only if subscribers were set)
    pub fn build(self) -> (TaskQueue<T>, Worker) {
        let name: Arc<str> = Arc::from(self.cfg.name.as_str());
        let resource: Arc<str> = Arc::from(self.cfg.resource.as_str());
        let limiter = self.limiter.unwrap_or_else(default_rate_limiter);
        let queue = Arc::new(DedupQueue::new(self.cfg.name.clone(), limiter));
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let done = CancellationToken::new();
        let drained = CancellationToken::new();

        if self.subscribers.is_empty() {
            drained.cancel();
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone(), Arc::clone(&name));
            subscriber_listener(bus.subscribe(), set, done.clone(), drained.clone());
        }

        let dispatcher = Dispatcher {
            queue: Arc::clone(&queue),
            handler: self.handler,
            bus: bus.clone(),
            name: Arc::clone(&name),
            resource: Arc::clone(&resource),
        };
        let worker = Worker::new(dispatcher, done.clone());

        let shared = Arc::new(Shared {
            name,
            resource,
            queue,
            bus,
            done,
            drained,
        });
        (TaskQueue::from_parts(shared, self.key_fn), worker)
    }
}

/// Forwards bus events to the subscriber set until the worker is done,
/// then drains what is left and waits for the subscribers to finish.
/// `drained` fires once that is over.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    done: CancellationToken,
    drained: CancellationToken,
) {
    tokio::spawn(async move {
        let _drained = drained.drop_guard();
        loop {
            tokio::select! {
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                () = done.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::SyncError;
    use crate::events::EventKind;
    use crate::handlers::SyncFn;
    use crate::keys::key_fn;

    #[derive(Default)]
    struct Counter {
        succeeded: AtomicUsize,
        stopped: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, ev: &Event) {
            match ev.kind {
                EventKind::SyncSucceeded => self.succeeded.fetch_add(1, Ordering::SeqCst),
                EventKind::WorkerStopped => self.stopped.fetch_add(1, Ordering::SeqCst),
                _ => 0,
            };
        }
    }

    #[tokio::test]
    async fn subscribers_see_events_before_shutdown_returns() {
        let counter = Arc::new(Counter::default());
        let handler = SyncFn::arc(|_key: String| async { Ok::<(), SyncError>(()) });
        let (tq, worker) = TaskQueueBuilder::new(
            QueueConfig::new("ids", "id"),
            handler,
            key_fn(|id: &u32| Ok(id.to_string())),
        )
        .with_subscribers(vec![counter.clone() as Arc<dyn Subscribe>])
        .build();
        let h = tokio::spawn(worker.run());

        tq.enqueue(&[1, 2]);
        while counter.succeeded.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        tq.shutdown().await;
        h.await.unwrap();

        assert_eq!(counter.stopped.load(Ordering::SeqCst), 1);
    }

    struct Slow(Arc<Counter>);

    #[async_trait]
    impl Subscribe for Slow {
        async fn on_event(&self, ev: &Event) {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            self.0.on_event(ev).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_concurrent_shutdown_waits_for_slow_subscribers() {
        let counter = Arc::new(Counter::default());
        let handler = SyncFn::arc(|_key: String| async { Ok::<(), SyncError>(()) });
        let (tq, worker) = TaskQueueBuilder::new(
            QueueConfig::new("ids", "id"),
            handler,
            key_fn(|id: &u32| Ok(id.to_string())),
        )
        .with_subscribers(vec![Arc::new(Slow(counter.clone())) as Arc<dyn Subscribe>])
        .build();
        let h = tokio::spawn(worker.run());
        tq.enqueue(&[1]);

        let callers: Vec<_> = (0..2)
            .map(|_| {
                let (tq, counter) = (tq.clone(), counter.clone());
                tokio::spawn(async move {
                    tq.shutdown().await;
                    counter.stopped.load(Ordering::SeqCst)
                })
            })
            .collect();
        for c in callers {
            assert_eq!(c.await.unwrap(), 1);
        }
        h.await.unwrap();
    }
}
