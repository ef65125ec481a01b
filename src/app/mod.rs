pub mod state;
mod actions;
mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::api::{ApiGateway, ReqwestTransport, SafeSphereApi, Transport};
use crate::cache::EntityCache;
use crate::config::Config;
use crate::error::ClientError;
use crate::markers::{surface::CanvasSurface, Layer, Marker, MarkerKey, MarkerReconciler};
use crate::models::{Coordinates, Disaster, User, WeatherSnapshot};
use crate::notify::Notifications;
use crate::safety::SafetySummary;
use crate::session::{FileSessionBackend, SessionBackend, SessionStore};

pub use state::{DialogMode, DialogState, HelpState, MapView, SidebarState, SidebarTab};

pub struct App {
    // Configuration
    pub config: Config,

    // Core components
    pub api: SafeSphereApi,
    pub cache: EntityCache,
    pub markers: MarkerReconciler<CanvasSurface>,
    pub notifications: Notifications,

    // Data not kept in the entity cache
    pub current_user: Option<User>,
    pub weather: Option<WeatherSnapshot>,
    pub disasters: Vec<Disaster>,
    pub safety: SafetySummary,
    pub last_sync: Option<DateTime<Local>>,

    // View state
    pub map: MapView,
    /// Marker picked directly on the map; overrides the sidebar selection
    pub map_selection: Option<MarkerKey>,
    pub sidebar: SidebarState,
    pub dialog: DialogState,
    pub show_help: bool,
    pub help: HelpState,
}

impl App {
    pub fn new(config: Config, transport: Arc<dyn Transport>, session: Box<dyn SessionBackend>) -> Self {
        let gateway = ApiGateway::new(&config.api.base_url, transport, SessionStore::open(session));

        let mut markers = MarkerReconciler::new(CanvasSurface::default());
        markers.set_layer_visible(Layer::Friends, config.map.show_friends);
        markers.set_layer_visible(Layer::Locations, config.map.show_locations);
        markers.set_layer_visible(Layer::Weather, config.map.show_weather);
        markers.set_layer_visible(Layer::Disasters, config.map.show_disasters);

        let notifications = Notifications::new(
            config.notifications.duration(),
            config.notifications.max_visible,
        );
        let map = MapView::new(config.map.default_center(), config.map.zoom_span);

        Self {
            api: SafeSphereApi::new(gateway),
            cache: EntityCache::new(),
            markers,
            notifications,
            current_user: None,
            weather: None,
            disasters: Vec::new(),
            safety: SafetySummary::default(),
            last_sync: None,
            map,
            map_selection: None,
            sidebar: SidebarState::default(),
            dialog: DialogState::default(),
            show_help: false,
            help: HelpState::default(),
            config,
        }
    }

    /// Production wiring: reqwest transport and the on-disk session file.
    pub fn from_config(config: Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config.api.timeout())
            .context("Failed to build HTTP client")?;
        let session = FileSessionBackend::new(FileSessionBackend::default_path()?);
        tracing::info!("Using SafeSphere API at {}", config.api.base_url);
        Ok(Self::new(config, Arc::new(transport), Box::new(session)))
    }

    /// Resume a saved session, or ask the user to sign in.
    pub async fn bootstrap(&mut self) {
        if self.api.is_authenticated() {
            tracing::info!("Resuming saved session");
            self.load_initial_data().await;
        } else {
            self.dialog.open(DialogMode::Login);
            self.notifications.info("Please sign in to continue");
        }
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn open_dialog(&mut self, mode: DialogMode) {
        self.dialog.open(mode);
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
    }

    /// Forget everything tied to the current session.
    fn reset_session_state(&mut self) {
        self.api.clear_session();
        self.cache.clear();
        self.markers.clear();
        self.current_user = None;
        self.weather = None;
        self.disasters.clear();
        self.safety = SafetySummary::default();
        self.last_sync = None;
        self.map_selection = None;
        self.sidebar.reset();
    }

    /// The server refused our token: drop local state and ask for credentials.
    pub fn handle_auth_failure(&mut self, message: &str) {
        tracing::warn!("Authentication failed: {}", message);
        self.reset_session_state();
        self.dialog.open(DialogMode::Login);
        self.notifications.error("Session expired. Please sign in again.");
    }

    /// Operation boundary: auth errors end the session, everything else is
    /// shown to the user.
    pub(crate) fn report_error(&mut self, context: &str, err: ClientError) {
        if err.is_auth() {
            self.handle_auth_failure(&err.to_string());
        } else {
            self.notifications.error(format!("{}: {}", context, err));
        }
    }

    /// Length of the list behind a sidebar tab.
    pub fn tab_len(&self, tab: SidebarTab) -> usize {
        match tab {
            SidebarTab::Friends => self.cache.friends().len(),
            SidebarTab::Requests => self.cache.friend_requests().len(),
            SidebarTab::Locations => self.cache.locations().len(),
            SidebarTab::Alerts => self.cache.alerts().len(),
        }
    }

    /// Marker whose popup is shown: the one picked on the map if it is still
    /// drawn, otherwise the one bound to the sidebar selection.
    pub fn selected_marker(&self) -> Option<&Marker> {
        if let Some(marker) = self
            .map_selection
            .as_ref()
            .and_then(|key| self.markers.surface().get(key))
        {
            return Some(marker);
        }

        let idx = self.sidebar.selected();
        let key = match self.sidebar.tab {
            SidebarTab::Friends => {
                MarkerKey::new(Layer::Friends, self.cache.friends().get(idx)?.id.to_string())
            }
            SidebarTab::Locations => {
                MarkerKey::new(Layer::Locations, self.cache.locations().get(idx)?.id.to_string())
            }
            SidebarTab::Requests | SidebarTab::Alerts => return None,
        };
        self.markers.marker(&key)
    }

    /// Step through the markers drawn on the map, in layer order, so weather
    /// and disaster popups can be shown too.
    pub fn cycle_map_selection(&mut self) {
        let keys: Vec<MarkerKey> = self
            .markers
            .surface()
            .attached()
            .map(|m| m.key.clone())
            .collect();
        if keys.is_empty() {
            self.map_selection = None;
            self.notifications.info("No markers on the map");
            return;
        }

        let next = match self
            .map_selection
            .as_ref()
            .and_then(|current| keys.iter().position(|k| k == current))
        {
            Some(i) => (i + 1) % keys.len(),
            None => 0,
        };
        self.map_selection = keys.into_iter().nth(next);
    }

    /// Hand the popup back to the sidebar selection.
    pub fn clear_map_selection(&mut self) {
        self.map_selection = None;
    }

    /// Map position of the sidebar selection.
    pub fn selected_position(&self) -> Option<Coordinates> {
        let idx = self.sidebar.selected();
        match self.sidebar.tab {
            SidebarTab::Friends => self.cache.friends().get(idx)?.position(),
            SidebarTab::Requests => self.cache.friend_requests().get(idx)?.from_user.position(),
            SidebarTab::Locations => Some(self.cache.locations().get(idx)?.position()),
            SidebarTab::Alerts => {
                let alert = self.cache.alerts().get(idx)?;
                match self.cache.get_friend(alert.user_id) {
                    Some(friend) => friend.position(),
                    None => self
                        .current_user
                        .as_ref()
                        .filter(|u| u.id == alert.user_id)
                        .and_then(|u| u.position()),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::session::MemorySessionBackend;
    use crate::testing::FakeTransport;

    pub fn app(transport: Arc<FakeTransport>) -> App {
        App::new(Config::default(), transport, Box::new(MemorySessionBackend::default()))
    }

    pub fn signed_in_app(transport: Arc<FakeTransport>) -> App {
        App::new(
            Config::default(),
            transport,
            Box::new(MemorySessionBackend::with_token("tok-123")),
        )
    }

    pub fn notification_messages(app: &App) -> Vec<String> {
        app.notifications.visible().map(|n| n.message.clone()).collect()
    }
}
