//! Headless farm map: user tracking, directions to a farm and tile styles.

mod tracker;

pub use tracker::Tracker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    api::{DynGeolocation, DynSurface, LayerId, Marker},
    config::WidgetConfig,
    entities::{Coordinates, Destination, MapStyle, Route, RouteInfo, StyleSelector},
    error::{closed_error, unknown_location_error, Error},
    resolver::RouteResolver,
};

type OnClose = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct State {
    route: Option<Route>,
    route_layer: Option<LayerId>,
    styles: StyleSelector,
    origin: Option<Coordinates>,
    directions: bool,
    closed: bool,
}

struct Shared {
    config: WidgetConfig,
    destination: Destination,
    target: Option<Coordinates>,
    tracker: Tracker,
    resolver: RouteResolver,
    surface: Mutex<DynSurface>,
    state: Mutex<State>,
    latest: AtomicU64,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn place_user_marker(&self, user: Coordinates) {
        if lock(&self.state).closed {
            return;
        }

        lock(&self.surface).place_marker(Marker::User, user);
    }

    /// Directions are shown and were last resolved from somewhere else.
    fn needs_route(&self, user: Coordinates) -> bool {
        let state = lock(&self.state);
        state.directions && !state.closed && state.origin != Some(user)
    }

    /// Resolves a route for `user` and draws it unless a newer request
    /// started in the meantime, in which case the info of what is drawn is
    /// returned instead. `None` once the map is closed.
    async fn refresh_route(&self, user: Coordinates) -> Option<RouteInfo> {
        let target = self.target?;
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        lock(&self.state).origin = Some(user);

        let route = self.resolver.resolve(user, target).await;
        let info = route.info();

        if self.latest.load(Ordering::SeqCst) != generation {
            tracing::debug!("discarding superseded route {}", generation);

            let state = lock(&self.state);

            if state.closed {
                return None;
            }

            return Some(state.route.as_ref().map_or(info, Route::info));
        }

        self.apply_route(user, target, route).then_some(info)
    }

    fn apply_route(&self, user: Coordinates, target: Coordinates, route: Route) -> bool {
        let mut state = lock(&self.state);

        if state.closed {
            return false;
        }

        let mut surface = lock(&self.surface);

        if let Some(previous) = state.route_layer.take() {
            surface.remove_layer(previous);
        }

        if let Some(path) = route.path() {
            state.route_layer = Some(surface.add_route_line(path));
        }

        surface.fit_bounds(route.bounds(&user, &target), self.config.fit_padding);
        state.route = Some(route);

        true
    }
}

/// Follows position updates: moves the user marker and, while directions
/// are shown, re-resolves the route.
async fn follow(shared: Arc<Shared>, mut position: watch::Receiver<Option<Coordinates>>) {
    while position.changed().await.is_ok() {
        let current = *position.borrow_and_update();

        let Some(user) = current else {
            continue;
        };

        shared.place_user_marker(user);

        if shared.needs_route(user) {
            shared.refresh_route(user).await;
        }
    }
}

pub struct FarmMap {
    shared: Arc<Shared>,
    follower: Mutex<Option<JoinHandle<()>>>,
    on_close: Mutex<Option<OnClose>>,
}

impl FarmMap {
    /// Draws the base map and destination, then starts tracking the user.
    #[tracing::instrument(name = "FarmMap::open", skip_all)]
    pub async fn open(
        config: WidgetConfig,
        destination: Destination,
        geolocation: DynGeolocation,
        resolver: RouteResolver,
        mut surface: DynSurface,
    ) -> Self {
        let target = destination.coordinates();
        let styles = StyleSelector::default();
        let style = styles.current();

        surface.set_tile_layer(style, &style.tile_url(&config.tile_api_key), style.attribution());

        match target {
            Some(target) => {
                surface.place_marker(Marker::Destination, target);
                surface.set_view(target, config.user_zoom);
            }
            None => tracing::warn!("destination {:?} has no usable coordinates", destination.name),
        }

        let tracker = Tracker::new(geolocation, config.default_location);
        let position = tracker.subscribe();

        let shared = Arc::new(Shared {
            config,
            destination,
            target,
            tracker,
            resolver,
            surface: Mutex::new(surface),
            state: Mutex::new(State {
                styles,
                ..Default::default()
            }),
            latest: AtomicU64::new(0),
        });

        let follower = tokio::spawn(follow(shared.clone(), position));

        shared.tracker.start_watch();

        if shared.tracker.is_supported() {
            if let Ok(Some(user)) = shared.tracker.acquire_fix().await {
                shared.place_user_marker(user);
                lock(&shared.surface).set_view(user, shared.config.user_zoom);
            }
        }

        Self {
            shared,
            follower: Mutex::new(Some(follower)),
            on_close: Mutex::new(None),
        }
    }

    /// Called once when the widget closes.
    pub fn set_on_close(&self, callback: impl FnOnce() + Send + 'static) {
        *lock(&self.on_close) = Some(Box::new(callback));
    }

    /// Routes from the known user position, acquiring one only if none is
    /// known yet. Routing failures resolve to an estimate.
    #[tracing::instrument(skip(self))]
    pub async fn get_directions(&self) -> Result<RouteInfo, Error> {
        if self.is_closed() {
            return Err(closed_error());
        }

        if self.shared.target.is_none() {
            return Err(unknown_location_error());
        }

        let user = self.shared.tracker.ensure_position().await;
        self.shared.place_user_marker(user);

        lock(&self.shared.state).directions = true;

        self.shared
            .refresh_route(user)
            .await
            .ok_or_else(closed_error)
    }

    pub fn cycle_style(&self) -> MapStyle {
        let mut state = lock(&self.shared.state);
        let style = state.styles.cycle();

        if !state.closed {
            let url = style.tile_url(&self.shared.config.tile_api_key);
            lock(&self.shared.surface).set_tile_layer(style, &url, style.attribution());
        }

        style
    }

    pub fn current_style(&self) -> MapStyle {
        lock(&self.shared.state).styles.current()
    }

    /// Summary panel contents; `None` until a route is resolved.
    pub fn summary(&self) -> Option<RouteInfo> {
        lock(&self.shared.state).route.as_ref().map(Route::info)
    }

    pub fn route(&self) -> Option<Route> {
        lock(&self.shared.state).route.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.resolver.is_loading()
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.shared.tracker.current()
    }

    pub fn destination_label(&self) -> String {
        self.shared.destination.label()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.shared.state).closed
    }

    /// Releases the position watch, stops background work and clears what
    /// the map drew. Safe to call more than once.
    #[tracing::instrument(skip(self))]
    pub fn close(&self) {
        let route_layer = {
            let mut state = lock(&self.shared.state);

            if state.closed {
                return;
            }

            state.closed = true;
            state.directions = false;
            state.route = None;
            state.origin = None;
            state.route_layer.take()
        };

        self.shared.tracker.stop();

        if let Some(follower) = lock(&self.follower).take() {
            follower.abort();
        }

        {
            let mut surface = lock(&self.shared.surface);

            if let Some(layer) = route_layer {
                surface.remove_layer(layer);
            }

            surface.remove_marker(Marker::User);
            surface.remove_marker(Marker::Destination);
        }

        let callback = lock(&self.on_close).take();

        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Drop for FarmMap {
    fn drop(&mut self) {
        self.close();
    }
}
