//! In-memory stand-ins for the platform seams, used by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use geo_types::{LineString, Rect};

use crate::{
    api::{
        GeolocationProvider, LayerId, MapSurface, Marker, PositionError, PositionOptions,
        RoutingService, Watch, WatchId,
    },
    entities::{Coordinates, MapStyle, Position, RoutedPath},
    error::{upstream_error, Error},
};

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("condition not reached in time");
}

type Update = Result<Position, PositionError>;

pub struct FakeGeolocation {
    supported: bool,
    fix: Result<Coordinates, PositionError>,
    fix_delay: Option<Duration>,
    updates: Mutex<Option<async_channel::Sender<Update>>>,
    next_id: AtomicU64,
    current_calls: AtomicUsize,
    watch_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl FakeGeolocation {
    fn build(
        supported: bool,
        fix: Result<Coordinates, PositionError>,
        fix_delay: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            supported,
            fix,
            fix_delay,
            updates: Mutex::new(None),
            next_id: AtomicU64::new(1),
            current_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
            clear_calls: AtomicUsize::new(0),
        })
    }

    pub fn with_fix(coordinates: Coordinates) -> Arc<Self> {
        Self::build(true, Ok(coordinates), None)
    }

    /// Answers the one-shot request only after `delay`.
    pub fn with_slow_fix(coordinates: Coordinates, delay: Duration) -> Arc<Self> {
        Self::build(true, Ok(coordinates), Some(delay))
    }

    pub fn failing(err: PositionError) -> Arc<Self> {
        Self::build(true, Err(err), None)
    }

    pub fn unsupported() -> Arc<Self> {
        Self::build(false, Err(PositionError::Unsupported), None)
    }

    /// Delivers an update to the active watch, if any.
    pub async fn push(&self, update: Result<Coordinates, PositionError>) {
        let sender = self.updates.lock().unwrap().clone();

        if let Some(sender) = sender {
            let update = update.map(|coordinates| Position::new(coordinates, 5.0));
            sender.send(update).await.unwrap();
        }
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeolocationProvider for FakeGeolocation {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<Position, PositionError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.fix_delay {
            tokio::time::sleep(delay).await;
        }

        self.fix
            .map(|coordinates| Position::new(coordinates, 1000.0))
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<Watch, PositionError> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);

        let (sender, updates) = async_channel::unbounded();
        *self.updates.lock().unwrap() = Some(sender);

        Ok(Watch {
            id: WatchId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            updates,
        })
    }

    fn clear_watch(&self, _id: WatchId) {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().take();
    }
}

type Answer = (f64, f64, Duration);

pub struct FakeRouter {
    outcome: Option<(f64, f64)>,
    delay: Option<Duration>,
    script: Mutex<VecDeque<Answer>>,
    calls: AtomicUsize,
}

impl FakeRouter {
    fn build(outcome: Option<(f64, f64)>, delay: Option<Duration>) -> Self {
        Self {
            outcome,
            delay,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn routed(distance: f64, duration: f64) -> Arc<Self> {
        Arc::new(Self::build(Some((distance, duration)), None))
    }

    pub fn slow(distance: f64, duration: f64, delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(Some((distance, duration)), Some(delay)))
    }

    /// Behaves like an unreachable routing service.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(None, None))
    }

    /// Answers the n-th call with the n-th `(distance, duration, delay)`,
    /// then fails like [`FakeRouter::failing`].
    pub fn staggered(answers: Vec<Answer>) -> Arc<Self> {
        let router = Self::build(None, None);
        *router.script.lock().unwrap() = answers.into();
        Arc::new(router)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingService for FakeRouter {
    async fn driving_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RoutedPath, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();

        let (outcome, delay) = match scripted {
            Some((distance, duration, delay)) => (Some((distance, duration)), Some(delay)),
            None => (self.outcome, self.delay),
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (distance, duration) = outcome.ok_or_else(upstream_error)?;

        Ok(RoutedPath {
            distance,
            duration,
            path: LineString::from(vec![
                (origin.longitude, origin.latitude),
                (destination.longitude, destination.latitude),
            ]),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    TileLayer(MapStyle),
    View(Coordinates, u8),
    Marker(Marker, Coordinates),
    RemoveMarker(Marker),
    AddLine(LayerId),
    RemoveLayer(LayerId),
    FitBounds(Rect<f64>, u32),
}

#[derive(Clone, Default)]
pub struct SurfaceLog(Arc<Mutex<Vec<SurfaceEvent>>>);

impl SurfaceLog {
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &SurfaceEvent) -> bool {
        self.0.lock().unwrap().contains(event)
    }

    pub fn added_lines(&self) -> Vec<LayerId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::AddLine(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SurfaceEvent) {
        self.0.lock().unwrap().push(event);
    }
}

pub struct RecordingSurface {
    log: SurfaceLog,
}

impl RecordingSurface {
    pub fn new() -> (Self, SurfaceLog) {
        let log = SurfaceLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl MapSurface for RecordingSurface {
    fn set_tile_layer(&mut self, style: MapStyle, _url: &str, _attribution: &str) {
        self.log.push(SurfaceEvent::TileLayer(style));
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.log.push(SurfaceEvent::View(center, zoom));
    }

    fn place_marker(&mut self, marker: Marker, at: Coordinates) {
        self.log.push(SurfaceEvent::Marker(marker, at));
    }

    fn remove_marker(&mut self, marker: Marker) {
        self.log.push(SurfaceEvent::RemoveMarker(marker));
    }

    fn add_route_line(&mut self, _path: &LineString<f64>) -> LayerId {
        let id = LayerId::new();
        self.log.push(SurfaceEvent::AddLine(id));
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.log.push(SurfaceEvent::RemoveLayer(id));
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: u32) {
        self.log.push(SurfaceEvent::FitBounds(bounds, padding));
    }
}
