use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    api::{DynGeolocation, PositionError, PositionOptions, WatchId},
    entities::Coordinates,
};

struct Subscription {
    id: WatchId,
    pump: JoinHandle<()>,
}

/// Best-effort, continuously refreshed user position.
///
/// The continuous subscription is released exactly once, either by
/// [`Tracker::stop`] or when the tracker is dropped.
pub struct Tracker {
    provider: DynGeolocation,
    fallback: Coordinates,
    position: Arc<watch::Sender<Option<Coordinates>>>,
    /// A provider fix has been stored; the default location no longer counts.
    located: Arc<AtomicBool>,
    subscription: Mutex<Option<Subscription>>,
}

impl Tracker {
    pub fn new(provider: DynGeolocation, fallback: Coordinates) -> Self {
        let (position, _) = watch::channel(None);

        Self {
            provider,
            fallback,
            position: Arc::new(position),
            located: Arc::new(AtomicBool::new(false)),
            subscription: Mutex::new(None),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.provider.is_supported()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Coordinates>> {
        self.position.subscribe()
    }

    pub fn current(&self) -> Option<Coordinates> {
        *self.position.borrow()
    }

    pub fn is_watching(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Single coarse fix. On failure the default location is used unless a
    /// position is already known.
    ///
    /// The fix is stored only while nothing better than the default is
    /// known; `Ok(None)` means an earlier provider position was kept.
    #[tracing::instrument(skip(self))]
    pub async fn acquire_fix(&self) -> Result<Option<Coordinates>, PositionError> {
        if !self.provider.is_supported() {
            self.use_fallback();
            return Err(PositionError::Unsupported);
        }

        let options = PositionOptions::initial_fix();
        let result = tokio::time::timeout(options.timeout, self.provider.current_position(options))
            .await
            .unwrap_or(Err(PositionError::Timeout));

        match result {
            Ok(position) => {
                tracing::info!("initial fix accurate to {} m", position.accuracy);

                let applied = self.position.send_if_modified(|current| {
                    if self.located.swap(true, Ordering::SeqCst) {
                        return false;
                    }

                    *current = Some(position.coordinates);
                    true
                });

                if !applied {
                    tracing::debug!("initial fix superseded by a known position");
                    return Ok(None);
                }

                Ok(Some(position.coordinates))
            }
            Err(err) => {
                tracing::warn!("initial position unavailable: {}", err);
                self.use_fallback();
                Err(err)
            }
        }
    }

    /// The known position, acquiring one only when none is known yet.
    pub async fn ensure_position(&self) -> Coordinates {
        if let Some(coordinates) = self.current() {
            return coordinates;
        }

        match self.acquire_fix().await {
            Ok(Some(coordinates)) => coordinates,
            _ => self.current().unwrap_or(self.fallback),
        }
    }

    /// Starts the high-accuracy subscription. Without geolocation support the
    /// default location is used and nothing is subscribed.
    #[tracing::instrument(skip(self))]
    pub fn start_watch(&self) {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if subscription.is_some() {
            return;
        }

        if !self.provider.is_supported() {
            tracing::warn!("geolocation unsupported, using default location");
            self.use_fallback();
            return;
        }

        let watch = match self.provider.watch_position(PositionOptions::continuous()) {
            Ok(watch) => watch,
            Err(err) => {
                tracing::warn!("position watch failed to start: {}", err);
                return;
            }
        };

        let position = self.position.clone();
        let located = self.located.clone();
        let updates = watch.updates;

        let pump = tokio::spawn(async move {
            while let Ok(update) = updates.recv().await {
                match update {
                    Ok(fix) => position.send_modify(|current| {
                        located.store(true, Ordering::SeqCst);
                        *current = Some(fix.coordinates);
                    }),
                    Err(err) => tracing::warn!("position update failed: {}", err),
                }
            }
        });

        tracing::info!("watching position with id {:?}", watch.id);

        *subscription = Some(Subscription { id: watch.id, pump });
    }

    pub fn stop(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(Subscription { id, pump }) = subscription {
            self.provider.clear_watch(id);
            pump.abort();
            tracing::info!("cleared position watch {:?}", id);
        }
    }

    fn use_fallback(&self) {
        self.position.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }

            *current = Some(self.fallback);
            true
        });
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}
