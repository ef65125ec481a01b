//! Server synchronization.
//!
//! The initial load and every polling tick go through here. A cycle refreshes
//! the entity cache, then re-derives the map markers and the safety summary
//! from it. Runs on the app loop, so a later cycle always overwrites an
//! earlier one.

use chrono::Local;

use super::{App, SidebarTab};
use crate::cache::RefreshReport;
use crate::markers::projection::{disaster_specs, friend_specs, location_specs, weather_spec};
use crate::markers::Layer;
use crate::safety::SafetySummary;

impl App {
    /// Everything needed after sign-in: profile, all cached categories,
    /// weather and nearby disasters.
    pub async fn load_initial_data(&mut self) {
        match self.api.get_profile().await {
            Ok(user) => {
                if let Some(position) = user.position() {
                    self.map.focus(position);
                }
                tracing::info!("Signed in as {} <{}>", user.name, user.email);
                self.current_user = Some(user);
            }
            Err(e) if e.is_auth() => {
                self.handle_auth_failure(&e.to_string());
                return;
            }
            Err(e) => tracing::warn!("Failed to load profile: {}", e),
        }

        let report = self.cache.refresh_all(&self.api).await;
        if report.auth_failed() {
            self.handle_auth_failure("Session rejected while loading data");
            return;
        }
        for (category, e) in report.failures() {
            self.notifications.error(format!("Failed to load {}: {}", category, e));
        }
        self.apply_cache();
        self.last_sync = Some(Local::now());

        self.refresh_weather().await;
        self.refresh_disasters().await;
    }

    /// One polling tick. Failures are logged per category by the cache and
    /// never stop the cycle; only a rejected session ends it.
    pub async fn run_refresh_cycle(&mut self) -> RefreshReport {
        if !self.api.is_authenticated() {
            return RefreshReport::default();
        }

        let report = self.cache.refresh_all(&self.api).await;
        if report.auth_failed() {
            self.handle_auth_failure("Session rejected during refresh");
            return report;
        }

        self.apply_cache();
        self.last_sync = Some(Local::now());
        tracing::debug!("Refresh cycle done ({} failures)", report.failures().count());
        report
    }

    /// Re-derive markers, the safety summary and sidebar cursors from the cache.
    pub fn apply_cache(&mut self) {
        self.reconcile_markers();
        self.update_safety_status();
        for tab in SidebarTab::ALL {
            let len = self.tab_len(tab);
            self.sidebar.clamp(tab, len);
        }
    }

    pub fn reconcile_markers(&mut self) {
        self.markers.reconcile(Layer::Friends, friend_specs(self.cache.friends()));
        self.markers.reconcile(Layer::Locations, location_specs(self.cache.locations()));
    }

    pub fn update_safety_status(&mut self) {
        let summary = SafetySummary::from_friends(self.cache.friends());
        if summary != self.safety {
            tracing::info!("Safety status: {}", summary.text());
        }
        self.safety = summary;
    }

    /// Fetch weather for the map centre and replace the weather marker.
    pub async fn refresh_weather(&mut self) {
        let center = self.map.center;
        match self.api.get_weather(center).await {
            Ok(weather) => {
                self.markers.replace_singleton(Layer::Weather, Some(weather_spec(&weather)));
                self.weather = Some(weather);
            }
            Err(e) => self.report_error("Weather unavailable", e),
        }
    }

    pub async fn refresh_disasters(&mut self) {
        let center = self.map.center;
        let radius = self.config.map.disaster_radius_km;
        match self.api.get_disasters(center, radius).await {
            Ok(disasters) => {
                self.markers.reconcile(Layer::Disasters, disaster_specs(&disasters));
                self.disasters = disasters;
            }
            Err(e) => self.report_error("Disaster data unavailable", e),
        }
    }
}
