use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::{weather, ApiGateway};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Alert, AuthResponse, Coordinates, Credentials, Disaster, FriendRequest, Location,
    MessageResponse, NewLocation, ProfileUpdate, Registration, RequestAction, StatusChange, User,
    WeatherSnapshot,
};

fn to_body<T: Serialize>(value: &T) -> ClientResult<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Typed wrappers over the SafeSphere endpoints the client uses.
pub struct SafeSphereApi {
    gateway: ApiGateway,
}

impl SafeSphereApi {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway.session().is_authenticated()
    }

    /// Drop the local session. Persistence failures are logged, not returned.
    pub fn clear_session(&mut self) {
        if let Err(e) = self.gateway.session_mut().clear() {
            tracing::warn!("Failed to clear saved session: {}", e);
        }
    }

    fn store_session(&mut self, token: &str) {
        if let Err(e) = self.gateway.session_mut().set(token) {
            tracing::warn!("Session token not persisted: {}", e);
        }
    }

    // === Auth ===

    pub async fn register(&mut self, registration: &Registration) -> ClientResult<AuthResponse> {
        let response: AuthResponse = self
            .gateway
            .call_json("/auth/register", Method::POST, Some(to_body(registration)?))
            .await?;
        self.store_session(&response.session_token);
        Ok(response)
    }

    pub async fn login(&mut self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        let response: AuthResponse = self
            .gateway
            .call_json("/auth/login", Method::POST, Some(to_body(credentials)?))
            .await?;
        self.store_session(&response.session_token);
        Ok(response)
    }

    /// Tell the server to drop the session, then clear it locally whatever
    /// the server answered.
    pub async fn logout(&mut self) -> ClientResult<()> {
        let result = self.gateway.call("/auth/logout", Method::POST, None).await;
        self.clear_session();
        result.map(|_| ())
    }

    // === Users ===

    pub async fn get_profile(&self) -> ClientResult<User> {
        self.gateway.call_json("/users/profile", Method::GET, None).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        self.gateway
            .call_json("/users/profile", Method::PUT, Some(to_body(update)?))
            .await
    }

    // === Friends ===

    pub async fn send_friend_request(&self, friend_email: &str) -> ClientResult<MessageResponse> {
        let body = serde_json::json!({ "friend_email": friend_email });
        self.gateway.call_json("/friends/request", Method::POST, Some(body)).await
    }

    pub async fn get_friend_requests(&self) -> ClientResult<Vec<FriendRequest>> {
        self.gateway.call_json("/friends/requests", Method::GET, None).await
    }

    pub async fn respond_to_friend_request(
        &self,
        request_id: i64,
        action: RequestAction,
    ) -> ClientResult<MessageResponse> {
        let endpoint = format!("/friends/request/{}/{}", request_id, action.as_path());
        self.gateway.call_json(&endpoint, Method::POST, None).await
    }

    pub async fn get_friends(&self) -> ClientResult<Vec<User>> {
        self.gateway.call_json("/friends/", Method::GET, None).await
    }

    // === Locations ===

    pub async fn create_location(&self, location: &NewLocation) -> ClientResult<Location> {
        self.gateway
            .call_json("/locations/", Method::POST, Some(to_body(location)?))
            .await
    }

    pub async fn get_locations(&self) -> ClientResult<Vec<Location>> {
        self.gateway.call_json("/locations/", Method::GET, None).await
    }

    // === Weather / disasters ===

    pub async fn get_weather(&self, at: Coordinates) -> ClientResult<WeatherSnapshot> {
        let endpoint = format!("/weather/{}/{}", at.latitude, at.longitude);
        let value = self.gateway.call(&endpoint, Method::GET, None).await?;
        weather::normalize(value, at)
    }

    pub async fn get_disasters(&self, at: Coordinates, radius_km: f64) -> ClientResult<Vec<Disaster>> {
        let endpoint = format!("/disasters/{}/{}?radius={}", at.latitude, at.longitude, radius_km);
        self.gateway.call_json(&endpoint, Method::GET, None).await
    }

    // === Emergency ===

    pub async fn mark_safe(&self, user_id: i64) -> ClientResult<StatusChange> {
        self.gateway
            .call_json(&format!("/emergency/safe/{}", user_id), Method::POST, None)
            .await
    }

    pub async fn send_emergency_alert(&self, user_id: i64) -> ClientResult<StatusChange> {
        self.gateway
            .call_json(&format!("/emergency/alert/{}", user_id), Method::POST, None)
            .await
    }

    pub async fn mark_danger(&self, user_id: i64) -> ClientResult<StatusChange> {
        self.gateway
            .call_json(&format!("/emergency/danger/{}", user_id), Method::POST, None)
            .await
    }

    pub async fn get_alerts(&self) -> ClientResult<Vec<Alert>> {
        self.gateway.call_json("/emergency/alerts", Method::GET, None).await
    }
}
