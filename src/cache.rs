//! In-memory mirror of the server-side collections for the current session.
//!
//! Each category is replaced wholesale on refresh; nothing is merged. A failed
//! refresh leaves that category as it was and never touches the others.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::api::SafeSphereApi;
use crate::error::{ClientError, ClientResult};
use crate::models::{Alert, FriendRequest, Location, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Friends,
    FriendRequests,
    Locations,
    Alerts,
}

impl Category {
    /// Declared refresh order for a full batch.
    pub const REFRESH_ORDER: [Category; 4] = [
        Category::Friends,
        Category::FriendRequests,
        Category::Locations,
        Category::Alerts,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Friends => write!(f, "friends"),
            Category::FriendRequests => write!(f, "friend requests"),
            Category::Locations => write!(f, "locations"),
            Category::Alerts => write!(f, "alerts"),
        }
    }
}

/// Outcome of one batch refresh, one entry per category in refresh order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<(Category, ClientResult<usize>)>,
}

impl RefreshReport {
    pub fn succeeded(&self, category: Category) -> bool {
        self.outcomes
            .iter()
            .any(|(c, r)| *c == category && r.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Category, &ClientError)> {
        self.outcomes
            .iter()
            .filter_map(|(c, r)| r.as_ref().err().map(|e| (*c, e)))
    }

    /// True when any category was refused with a 401.
    pub fn auth_failed(&self) -> bool {
        self.failures().any(|(_, e)| e.is_auth())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for User {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for FriendRequest {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Location {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Alert {
    fn key(&self) -> i64 {
        self.id
    }
}

/// Keep the first record for each id, preserving server order.
fn dedup_by_id<T: Keyed>(items: Vec<T>, category: Category) -> Vec<T> {
    let total = items.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<T> = items.into_iter().filter(|item| seen.insert(item.key())).collect();
    if unique.len() != total {
        tracing::warn!(
            "Server returned {} duplicate {} record(s); kept first occurrence",
            total - unique.len(),
            category
        );
    }
    unique
}

#[derive(Default)]
pub struct EntityCache {
    friends: Vec<User>,
    friend_requests: Vec<FriendRequest>,
    locations: Vec<Location>,
    alerts: Vec<Alert>,
    last_refreshed: HashMap<Category, DateTime<Utc>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn friends(&self) -> &[User] {
        &self.friends
    }

    pub fn friend_requests(&self) -> &[FriendRequest] {
        &self.friend_requests
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get_friend(&self, id: i64) -> Option<&User> {
        self.friends.iter().find(|f| f.id == id)
    }

    pub fn get_location(&self, id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Friends => self.friends.len(),
            Category::FriendRequests => self.friend_requests.len(),
            Category::Locations => self.locations.len(),
            Category::Alerts => self.alerts.len(),
        }
    }

    pub fn last_refreshed(&self, category: Category) -> Option<DateTime<Utc>> {
        self.last_refreshed.get(&category).copied()
    }

    /// Forget everything, e.g. on logout.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn replace_friends(&mut self, friends: Vec<User>) -> usize {
        self.friends = dedup_by_id(friends, Category::Friends);
        self.touch(Category::Friends);
        self.friends.len()
    }

    pub fn replace_friend_requests(&mut self, requests: Vec<FriendRequest>) -> usize {
        self.friend_requests = dedup_by_id(requests, Category::FriendRequests);
        self.touch(Category::FriendRequests);
        self.friend_requests.len()
    }

    pub fn replace_locations(&mut self, locations: Vec<Location>) -> usize {
        self.locations = dedup_by_id(locations, Category::Locations);
        self.touch(Category::Locations);
        self.locations.len()
    }

    pub fn replace_alerts(&mut self, alerts: Vec<Alert>) -> usize {
        self.alerts = dedup_by_id(alerts, Category::Alerts);
        self.touch(Category::Alerts);
        self.alerts.len()
    }

    fn touch(&mut self, category: Category) {
        self.last_refreshed.insert(category, Utc::now());
    }

    /// Fetch one category and replace it. On error the cached copy is kept.
    pub async fn refresh(&mut self, api: &SafeSphereApi, category: Category) -> ClientResult<usize> {
        let count = match category {
            Category::Friends => {
                let friends = api.get_friends().await?;
                self.replace_friends(friends)
            }
            Category::FriendRequests => {
                let requests = api.get_friend_requests().await?;
                self.replace_friend_requests(requests)
            }
            Category::Locations => {
                let locations = api.get_locations().await?;
                self.replace_locations(locations)
            }
            Category::Alerts => {
                let alerts = api.get_alerts().await?;
                self.replace_alerts(alerts)
            }
        };
        tracing::debug!("Refreshed {} ({} records)", category, count);
        Ok(count)
    }

    /// Refresh every category in [`Category::REFRESH_ORDER`]. Failures are
    /// logged and reported per category; they never stop the batch.
    pub async fn refresh_all(&mut self, api: &SafeSphereApi) -> RefreshReport {
        let mut report = RefreshReport::default();
        for category in Category::REFRESH_ORDER {
            let outcome = self.refresh(api, category).await;
            let auth_failed = matches!(outcome, Err(ref e) if e.is_auth());
            if let Err(ref e) = outcome {
                tracing::warn!("Failed to refresh {}: {}", category, e);
            }
            report.outcomes.push((category, outcome));
            // Every later request would be rejected with the same token.
            if auth_failed {
                break;
            }
        }
        report
    }
}
