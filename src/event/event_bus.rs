use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::RwLock;

use anyhow::Result;
use log::error;
use tokio::task::JoinHandle;

use crate::event::Event;
use crate::subscriber::Subscriber;

type AsyncSubscriber<E> =
    Box<dyn Fn(E) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;
type Subscribers = Arc<RwLock<HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>>>;

/// Type-keyed async fan-out.
///
/// Delivery runs on the ambient tokio runtime, so `publish` must be called
/// from within one.
pub struct EventBus {
    subscribers: Subscribers,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register_callback<E, F, Fut>(&self, callback: F) -> &Self
    where
        E: Event + Clone,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let type_id = TypeId::of::<E>();

        let wrapped_sub: AsyncSubscriber<E> = Box::new(move |event| Box::pin(callback(event)));

        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(type_id)
            .or_default()
            .push(Box::new(wrapped_sub));
        self
    }

    pub fn register_subscriber<E, S>(&self, subscriber: Arc<S>) -> &Self
    where
        E: Event + Clone,
        S: Subscriber<E> + Send + Sync + 'static,
    {
        self.register_callback(move |event: E| {
            let h = subscriber.clone();
            async move { h.callback(event).await }
        })
    }

    /// Hands `event` to every subscriber of its type. Subscriber errors are
    /// logged; nothing is retried.
    ///
    /// Returns the delivery task, or `None` when nobody listens.
    pub fn publish<E>(&self, event: E) -> Option<JoinHandle<()>>
    where
        E: Event + Clone,
    {
        let type_id = TypeId::of::<E>();
        let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());

        let subs_list = subs.get(&type_id)?;
        let mut futures = Vec::new();
        for subs_box in subs_list {
            if let Some(sub) = subs_box.downcast_ref::<AsyncSubscriber<E>>() {
                futures.push(sub(event.clone()));
            }
        }
        let name = event.event_name();
        Some(tokio::spawn(async move {
            for result in futures::future::join_all(futures).await {
                if let Err(e) = result {
                    error!("Subscriber failed to handle {name}: {e:?}");
                }
            }
        }))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    #[derive(Clone)]
    struct Ping;

    impl Event for Ping {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_callback() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let hits = hits.clone();
            bus.register_callback(move |_: Ping| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });
        }

        bus.publish(Ping).unwrap().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_callback_does_not_block_others() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        bus.register_callback(|_: Ping| async { Err(anyhow::anyhow!("boom")) });
        let h = hits.clone();
        bus.register_callback(move |_: Ping| {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        bus.publish(Ping).unwrap().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        assert!(EventBus::new().publish(Ping).is_none());
    }
}
