//! User-triggered operations.
//!
//! Input is validated before anything goes on the wire. Errors stop at this
//! layer: they become notifications, or end the session when the server
//! rejects our token.

use super::{App, DialogMode, SidebarTab};
use crate::cache::Category;
use crate::error::{ClientError, ClientResult};
use crate::markers::Layer;
use crate::models::{
    validate_email, Coordinates, Credentials, LocationType, NewLocation, ProfileUpdate,
    Registration, RequestAction, SafetyStatus,
};

fn require(field: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        Err(ClientError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

fn parse_degrees(field: &str, value: &str) -> ClientResult<f64> {
    require(field, value)?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ClientError::validation(format!("{} must be a number", field)))
}

impl App {
    // === Session ===

    /// Sign in and load everything. A 401 here means bad credentials, so it is
    /// reported rather than treated as an expired session.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let email = email.trim();
        if let Err(e) = validate_email(email).and_then(|_| require("Password", password)) {
            self.notifications.error(e.to_string());
            return false;
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&credentials).await {
            Ok(response) => {
                self.notifications.success(format!("Welcome back, {}!", response.user.name));
                self.current_user = Some(response.user);
                self.dialog.close();
                self.load_initial_data().await;
                true
            }
            Err(e) => {
                self.notifications.error(format!("Login failed: {}", e));
                false
            }
        }
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> bool {
        let email = email.trim();
        let checked = require("Name", name)
            .and_then(|_| validate_email(email))
            .and_then(|_| require("Password", password));
        if let Err(e) = checked {
            self.notifications.error(e.to_string());
            return false;
        }

        let registration = Registration {
            name: name.trim().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: phone.map(str::trim).filter(|p| !p.is_empty()).map(String::from),
            latitude: None,
            longitude: None,
        };
        match self.api.register(&registration).await {
            Ok(response) => {
                self.notifications.success(format!("Welcome to SafeSphere, {}!", response.user.name));
                self.current_user = Some(response.user);
                self.dialog.close();
                self.load_initial_data().await;
                true
            }
            Err(e) => {
                self.notifications.error(format!("Registration failed: {}", e));
                false
            }
        }
    }

    /// Local state is cleared even when the server call fails.
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!("Server logout failed: {}", e);
        }
        self.reset_session_state();
        self.dialog.open(DialogMode::Login);
        self.notifications.info("Signed out");
    }

    // === Friends ===

    pub async fn send_friend_request(&mut self, email: &str) -> bool {
        let email = email.trim();
        if let Err(e) = validate_email(email) {
            self.notifications.error(e.to_string());
            return false;
        }

        match self.api.send_friend_request(email).await {
            Ok(response) => {
                self.notifications.success(response.message);
                true
            }
            Err(e) => {
                self.report_error("Failed to send friend request", e);
                false
            }
        }
    }

    pub async fn respond_to_friend_request(&mut self, request_id: i64, action: RequestAction) -> bool {
        match self.api.respond_to_friend_request(request_id, action).await {
            Ok(response) => {
                self.notifications.success(response.message);
                self.refresh_categories(&[Category::FriendRequests, Category::Friends]).await;
                true
            }
            Err(e) => {
                self.report_error("Failed to answer friend request", e);
                false
            }
        }
    }

    /// Accept or reject the request under the cursor.
    pub async fn respond_to_selected_request(&mut self, action: RequestAction) {
        if self.sidebar.tab != SidebarTab::Requests {
            return;
        }
        let Some(id) = self
            .cache
            .friend_requests()
            .get(self.sidebar.selected())
            .map(|r| r.id)
        else {
            self.notifications.info("No friend request selected");
            return;
        };
        self.respond_to_friend_request(id, action).await;
    }

    // === Locations ===

    pub async fn add_location(
        &mut self,
        name: &str,
        kind: LocationType,
        latitude: f64,
        longitude: f64,
    ) -> bool {
        let position = Coordinates::new(latitude, longitude);
        if let Err(e) = require("Location name", name).and_then(|_| position.validate()) {
            self.notifications.error(e.to_string());
            return false;
        }

        let location = NewLocation {
            name: name.trim().to_string(),
            kind,
            latitude,
            longitude,
        };
        match self.api.create_location(&location).await {
            Ok(created) => {
                self.notifications.success(format!("Location '{}' added", created.name));
                self.refresh_categories(&[Category::Locations]).await;
                true
            }
            Err(e) => {
                self.report_error("Failed to add location", e);
                false
            }
        }
    }

    // === Emergency ===

    pub async fn mark_safe(&mut self) -> bool {
        self.change_status(SafetyStatus::Safe).await
    }

    pub async fn send_emergency_alert(&mut self) -> bool {
        self.change_status(SafetyStatus::Warning).await
    }

    pub async fn mark_danger(&mut self) -> bool {
        self.change_status(SafetyStatus::Danger).await
    }

    async fn change_status(&mut self, status: SafetyStatus) -> bool {
        let Some(user_id) = self.current_user.as_ref().map(|u| u.id) else {
            self.notifications.error("Sign in first");
            return false;
        };

        let result = match status {
            SafetyStatus::Safe => self.api.mark_safe(user_id).await,
            SafetyStatus::Warning => self.api.send_emergency_alert(user_id).await,
            SafetyStatus::Danger => self.api.mark_danger(user_id).await,
        };

        match result {
            Ok(change) => {
                if let Some(user) = self.current_user.as_mut() {
                    user.status = Some(change.status);
                    user.is_safe = Some(change.status == SafetyStatus::Safe);
                }
                let message = match status {
                    SafetyStatus::Safe => "Your 'I'm Safe' status has been shared with your contacts!",
                    SafetyStatus::Warning => "Emergency alert sent to all contacts!",
                    SafetyStatus::Danger => "Danger status sent to all contacts!",
                };
                self.notifications.success(message);
                self.refresh_categories(&[Category::Alerts]).await;
                true
            }
            Err(e) => {
                self.report_error("Failed to update status", e);
                false
            }
        }
    }

    // === Position ===

    /// Publish the map centre as the user's own position.
    pub async fn share_position(&mut self) -> bool {
        if self.current_user.is_none() {
            self.notifications.error("Sign in first");
            return false;
        }
        let position = self.map.center;
        if let Err(e) = position.validate() {
            self.notifications.error(e.to_string());
            return false;
        }

        let update = ProfileUpdate {
            latitude: Some(position.latitude),
            longitude: Some(position.longitude),
            ..ProfileUpdate::default()
        };
        match self.api.update_profile(&update).await {
            Ok(user) => {
                self.notifications.success(format!(
                    "Position shared: {:.4}, {:.4}",
                    position.latitude, position.longitude
                ));
                self.current_user = Some(user);
                true
            }
            Err(e) => {
                self.report_error("Failed to share position", e);
                false
            }
        }
    }

    /// Refresh a few categories after a write, then re-derive the view.
    async fn refresh_categories(&mut self, categories: &[Category]) {
        for &category in categories {
            if let Err(e) = self.cache.refresh(&self.api, category).await {
                if e.is_auth() {
                    self.handle_auth_failure(&e.to_string());
                    return;
                }
                tracing::warn!("Failed to refresh {}: {}", category, e);
            }
        }
        self.apply_cache();
    }

    // === Map ===

    pub fn toggle_layer(&mut self, layer: Layer) {
        let visible = self.markers.toggle_layer(layer);
        let state = if visible { "shown" } else { "hidden" };
        self.notifications.info(format!("{} layer {}", layer.title(), state));
    }

    /// Centre the map on the sidebar selection. Weather follows the centre.
    pub async fn focus_selected(&mut self) {
        match self.selected_position() {
            Some(position) => self.focus_on(position).await,
            None => {
                self.notifications.info("Selection has no location on the map");
            }
        }
    }

    pub async fn focus_self(&mut self) {
        match self.current_user.as_ref().and_then(|u| u.position()) {
            Some(position) => self.focus_on(position).await,
            None => {
                self.notifications.info("Your position is not shared yet. Press 'p' to share the map centre.");
            }
        }
    }

    async fn focus_on(&mut self, position: Coordinates) {
        if self.map.center == position {
            return;
        }
        self.map.focus(position);
        self.refresh_weather().await;
    }

    pub fn zoom_in(&mut self) {
        self.map.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map.zoom_out();
    }

    // === Dialogs ===

    /// Act on the open dialog. Forms stay open when the action fails so the
    /// user can correct the input.
    pub async fn submit_dialog(&mut self) {
        let fields = self.dialog.fields.clone();
        let field = |i: usize| fields.get(i).map(|s| s.as_str()).unwrap_or("");

        match self.dialog.mode {
            DialogMode::None => {}
            DialogMode::Login => {
                self.login(field(0), field(1)).await;
            }
            DialogMode::Register => {
                let phone = Some(field(3)).filter(|p| !p.trim().is_empty());
                self.register(field(0), field(1), field(2), phone).await;
            }
            DialogMode::AddFriend => {
                if self.send_friend_request(field(0)).await {
                    self.dialog.close();
                }
            }
            DialogMode::AddLocation => {
                let kind = self.dialog.location_kind;
                let coords = parse_degrees("Latitude", field(1))
                    .and_then(|lat| parse_degrees("Longitude", field(2)).map(|lon| (lat, lon)));
                match coords {
                    Ok((lat, lon)) => {
                        if self.add_location(field(0), kind, lat, lon).await {
                            self.dialog.close();
                        }
                    }
                    Err(e) => {
                        self.notifications.error(e.to_string());
                    }
                }
            }
            DialogMode::ConfirmAlert => {
                self.dialog.close();
                self.send_emergency_alert().await;
            }
            DialogMode::ConfirmDanger => {
                self.dialog.close();
                self.mark_danger().await;
            }
        }
    }

    /// Prefill the add-location form with the map centre.
    pub fn open_add_location(&mut self) {
        self.dialog.open(DialogMode::AddLocation);
        let center = self.map.center;
        self.dialog.fields[1] = format!("{:.4}", center.latitude);
        self.dialog.fields[2] = format!("{:.4}", center.longitude);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::testing::FakeTransport;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn me() -> serde_json::Value {
        json!({"id": 7, "name": "Me", "email": "me@example.com", "status": "safe"})
    }

    #[tokio::test]
    async fn test_login_then_friends_use_bearer_token() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            Method::POST,
            "/auth/login",
            200,
            json!({"user": me(), "session_token": "tok-abc"}),
        );
        transport.respond(Method::GET, "/users/profile", 200, me());
        transport.respond(
            Method::GET,
            "/friends/",
            200,
            json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]),
        );
        let mut app = app(transport.clone());
        app.open_dialog(DialogMode::Login);

        assert!(app.login("me@example.com", "secret").await);

        assert_eq!(app.api.gateway().session().get(), Some("tok-abc"));
        assert!(!app.is_dialog_open());
        let friends_call = transport
            .requests()
            .into_iter()
            .find(|r| r.method == Method::GET && r.url.ends_with("/friends/"))
            .unwrap();
        assert_eq!(friends_call.header("Authorization"), Some("Bearer tok-abc"));
        assert_eq!(app.cache.friends().len(), 2);
        assert_eq!(app.cache.get_friend(2).map(|f| f.name.as_str()), Some("B"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_before_network() {
        let transport = Arc::new(FakeTransport::new());
        let mut app = app(transport.clone());

        assert!(!app.login("not-an-email", "pw").await);
        assert!(!app.login("me@example.com", "").await);

        assert!(transport.requests().is_empty());
        assert_eq!(notification_messages(&app).len(), 2);
    }

    #[tokio::test]
    async fn test_wrong_password_is_reported() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::POST, "/auth/login", 401, json!({"error": "Invalid credentials"}));
        let mut app = app(transport);
        app.open_dialog(DialogMode::Login);

        assert!(!app.login("me@example.com", "wrong").await);

        assert!(app.is_dialog_open());
        assert_eq!(notification_messages(&app), vec!["Login failed: Invalid credentials"]);
    }

    #[tokio::test]
    async fn test_duplicate_friend_request_leaves_cache_alone() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            Method::GET,
            "/friends/",
            200,
            json!([{"id": 1, "name": "A", "latitude": 1.0, "longitude": 1.0}]),
        );
        transport.respond(
            Method::POST,
            "/friends/request",
            409,
            json!({"error": "already requested"}),
        );
        let mut app = signed_in_app(transport.clone());
        app.run_refresh_cycle().await;
        let before = app.cache.friends().len();

        assert!(!app.send_friend_request("x@example.com").await);

        assert_eq!(app.cache.friends().len(), before);
        assert_eq!(app.markers.len(Layer::Friends), 1);
        let last = app.notifications.visible().last().unwrap();
        assert_eq!(last.severity, crate::notify::Severity::Error);
        assert_eq!(last.message, "Failed to send friend request: already requested");
        assert!(app.api.is_authenticated());
    }

    #[tokio::test]
    async fn test_accepting_request_refreshes_friends() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            Method::POST,
            "/friends/request/5/accept",
            200,
            json!({"message": "Friend request accepted"}),
        );
        transport.respond(Method::GET, "/friends/requests", 200, json!([]));
        transport.respond(Method::GET, "/friends/", 200, json!([{"id": 3, "name": "C"}]));
        let mut app = signed_in_app(transport.clone());

        assert!(app.respond_to_friend_request(5, RequestAction::Accept).await);

        assert_eq!(app.cache.friends().len(), 1);
        assert_eq!(
            transport.paths(),
            vec!["/friends/request/5/accept", "/friends/requests", "/friends/"]
        );
    }

    #[tokio::test]
    async fn test_add_location_validates_coordinates() {
        let transport = Arc::new(FakeTransport::new());
        let mut app = signed_in_app(transport.clone());

        assert!(!app.add_location("Cabin", LocationType::Home, 91.0, 0.0).await);
        assert!(!app.add_location("Cabin", LocationType::Home, 0.0, -181.0).await);
        assert!(!app.add_location("  ", LocationType::Home, 0.0, 0.0).await);

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_add_location_from_dialog() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            Method::POST,
            "/locations/",
            201,
            json!({"id": 11, "name": "Office", "type": "office", "latitude": 51.51, "longitude": -0.08}),
        );
        transport.respond(
            Method::GET,
            "/locations/",
            200,
            json!([{"id": 11, "name": "Office", "type": "office", "latitude": 51.51, "longitude": -0.08}]),
        );
        let mut app = signed_in_app(transport.clone());
        app.open_add_location();
        app.dialog.fields[0] = "Office".to_string();
        app.dialog.fields[1] = "51.51".to_string();
        app.dialog.fields[2] = "-0.08".to_string();
        app.dialog.location_kind = LocationType::Office;

        app.submit_dialog().await;

        assert!(!app.is_dialog_open());
        assert_eq!(app.markers.ids(Layer::Locations), vec!["11".to_string()]);
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["type"], "office");
        assert_eq!(body["latitude"], 51.51);
    }

    #[tokio::test]
    async fn test_bad_latitude_keeps_dialog_open() {
        let transport = Arc::new(FakeTransport::new());
        let mut app = signed_in_app(transport.clone());
        app.open_add_location();
        app.dialog.fields[0] = "Somewhere".to_string();
        app.dialog.fields[1] = "north".to_string();

        app.submit_dialog().await;

        assert!(app.is_dialog_open());
        assert_eq!(notification_messages(&app), vec!["Latitude must be a number"]);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_emergency_alert_updates_own_status() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/users/profile", 200, me());
        transport.respond(
            Method::POST,
            "/emergency/alert/7",
            200,
            json!({"message": "Emergency alert sent", "status": "alert"}),
        );
        let mut app = signed_in_app(transport.clone());
        app.load_initial_data().await;

        assert!(app.send_emergency_alert().await);

        let me = app.current_user.as_ref().unwrap();
        assert_eq!(me.safety(), SafetyStatus::Warning);
        assert_eq!(me.is_safe, Some(false));
        assert_eq!(transport.count(Method::GET, "/emergency/alerts"), 2);
    }

    #[tokio::test]
    async fn test_status_change_needs_a_user() {
        let transport = Arc::new(FakeTransport::new());
        let mut app = signed_in_app(transport.clone());

        assert!(!app.mark_safe().await);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_state_even_if_server_fails() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(Method::POST, "/auth/logout", "timed out");
        transport.respond(Method::GET, "/friends/", 200, json!([{"id": 1, "name": "A"}]));
        let mut app = signed_in_app(transport);
        app.run_refresh_cycle().await;

        app.logout().await;

        assert!(!app.api.is_authenticated());
        assert!(app.cache.friends().is_empty());
        assert_eq!(app.dialog.mode, DialogMode::Login);
    }

    #[test]
    fn test_toggle_layer_keeps_markers() {
        let mut app = app(Arc::new(FakeTransport::new()));
        app.cache.replace_friends(
            serde_json::from_value(json!([{"id": 1, "name": "A", "latitude": 1.0, "longitude": 2.0}])).unwrap(),
        );
        app.apply_cache();
        let key = crate::markers::MarkerKey::new(Layer::Friends, "1");
        let handle = app.markers.marker(&key).unwrap().handle;

        app.toggle_layer(Layer::Friends);
        assert!(app.markers.surface().get(&key).is_none());
        app.toggle_layer(Layer::Friends);

        assert_eq!(app.markers.surface().get(&key).map(|m| m.handle), Some(handle));
    }

    #[tokio::test]
    async fn test_focus_selected_friend_moves_weather() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(
            Method::GET,
            "/weather/40/-3.5",
            200,
            json!({"temperature": 30, "humidity": 20, "description": "sunny"}),
        );
        let mut app = app(transport.clone());
        app.cache.replace_friends(
            serde_json::from_value(json!([
                {"id": 1, "name": "A"},
                {"id": 2, "name": "B", "latitude": 40.0, "longitude": -3.5}
            ]))
            .unwrap(),
        );

        app.focus_selected().await;
        assert_eq!(app.map.center, Coordinates::new(51.505, -0.09));
        assert!(transport.requests().is_empty());

        app.sidebar.move_down(2);
        app.focus_selected().await;
        assert_eq!(app.map.center, Coordinates::new(40.0, -3.5));
        let weather = app.weather.as_ref().unwrap();
        assert_eq!(weather.position(), Coordinates::new(40.0, -3.5));
        assert_eq!(weather.temperature_label(), "30°C");

        // Same centre again: nothing refetched
        app.focus_selected().await;
        assert_eq!(transport.count(Method::GET, "/weather/40/-3.5"), 1);
    }

    #[tokio::test]
    async fn test_share_position_sends_map_centre() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/users/profile", 200, me());
        transport.respond(
            Method::PUT,
            "/users/profile",
            200,
            json!({"id": 7, "name": "Me", "email": "me@example.com", "latitude": 48.8566, "longitude": 2.3522}),
        );
        let mut app = signed_in_app(transport.clone());
        app.load_initial_data().await;
        assert_eq!(app.current_user.as_ref().and_then(|u| u.position()), None);
        app.map.focus(Coordinates::new(48.8566, 2.3522));

        assert!(app.share_position().await);

        let put = transport
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PUT)
            .unwrap();
        let body = put.body.clone().unwrap();
        assert_eq!(body, json!({"latitude": 48.8566, "longitude": 2.3522}));
        assert_eq!(put.header("Authorization"), Some("Bearer tok-123"));
        assert_eq!(
            app.current_user.as_ref().and_then(|u| u.position()),
            Some(Coordinates::new(48.8566, 2.3522))
        );
    }

    #[tokio::test]
    async fn test_share_position_rejects_invalid_centre() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/users/profile", 200, me());
        let mut app = signed_in_app(transport.clone());
        app.load_initial_data().await;
        app.map.center = Coordinates::new(95.0, 0.0);

        assert!(!app.share_position().await);
        assert_eq!(transport.count(Method::PUT, "/users/profile"), 0);
    }

    #[tokio::test]
    async fn test_share_position_needs_a_user() {
        let transport = Arc::new(FakeTransport::new());
        let mut app = signed_in_app(transport.clone());

        assert!(!app.share_position().await);
        assert!(transport.requests().is_empty());
    }
}
