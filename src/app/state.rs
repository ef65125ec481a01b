use crate::models::{Coordinates, LocationType};

const MIN_SPAN: f64 = 0.005;
const MAX_SPAN: f64 = 90.0;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SidebarTab {
    #[default]
    Friends,
    Requests,
    Locations,
    Alerts,
}

impl SidebarTab {
    pub const ALL: [SidebarTab; 4] = [
        SidebarTab::Friends,
        SidebarTab::Requests,
        SidebarTab::Locations,
        SidebarTab::Alerts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SidebarTab::Friends => "Friends",
            SidebarTab::Requests => "Requests",
            SidebarTab::Locations => "Locations",
            SidebarTab::Alerts => "Alerts",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Sidebar tab plus one cursor per tab
#[derive(Debug, Default)]
pub struct SidebarState {
    pub tab: SidebarTab,
    selected: [usize; 4],
}

impl SidebarState {
    pub fn selected(&self) -> usize {
        self.selected[self.tab.index()]
    }

    pub fn select(&mut self, index: usize) {
        self.selected[self.tab.index()] = index;
    }

    pub fn move_down(&mut self, len: usize) {
        let cur = self.selected();
        if cur + 1 < len {
            self.select(cur + 1);
        }
    }

    pub fn move_up(&mut self) {
        let cur = self.selected();
        self.select(cur.saturating_sub(1));
    }

    /// Keep the cursor inside a list that may have shrunk after a refresh.
    pub fn clamp(&mut self, tab: SidebarTab, len: usize) {
        let idx = tab.index();
        if self.selected[idx] >= len {
            self.selected[idx] = len.saturating_sub(1);
        }
    }

    pub fn reset(&mut self) {
        self.selected = [0; 4];
    }
}

/// Visible map area: a centre plus a half-width in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub span: f64,
}

impl MapView {
    pub fn new(center: Coordinates, span: f64) -> Self {
        Self {
            center,
            span: span.clamp(MIN_SPAN, MAX_SPAN),
        }
    }

    pub fn zoom_in(&mut self) {
        self.span = (self.span / 2.0).max(MIN_SPAN);
    }

    pub fn zoom_out(&mut self) {
        self.span = (self.span * 2.0).min(MAX_SPAN);
    }

    pub fn focus(&mut self, at: Coordinates) {
        self.center = at;
    }

    /// Longitude bounds, widened so the terminal's tall cells keep roughly
    /// square geography.
    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.span * 2.0;
        [
            (self.center.longitude - half).max(-180.0),
            (self.center.longitude + half).min(180.0),
        ]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        [
            (self.center.latitude - self.span).max(-90.0),
            (self.center.latitude + self.span).min(90.0),
        ]
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum DialogMode {
    #[default]
    None,
    Login,
    Register,
    AddFriend,
    AddLocation,
    ConfirmAlert,
    ConfirmDanger,
}

impl DialogMode {
    pub fn field_labels(self) -> &'static [&'static str] {
        match self {
            DialogMode::Login => &["Email", "Password"],
            DialogMode::Register => &["Name", "Email", "Password", "Phone (optional)"],
            DialogMode::AddFriend => &["Friend's email"],
            DialogMode::AddLocation => &["Name", "Latitude", "Longitude"],
            DialogMode::None | DialogMode::ConfirmAlert | DialogMode::ConfirmDanger => &[],
        }
    }

    /// Whether the field at `index` should be masked on screen.
    pub fn is_secret(self, index: usize) -> bool {
        matches!(
            (self, index),
            (DialogMode::Login, 1) | (DialogMode::Register, 2)
        )
    }
}

/// Dialog state
#[derive(Debug, Default)]
pub struct DialogState {
    pub mode: DialogMode,
    pub fields: Vec<String>,
    pub focused: usize,
    pub location_kind: LocationType,
}

impl DialogState {
    pub fn open(&mut self, mode: DialogMode) {
        self.mode = mode;
        self.fields = vec![String::new(); mode.field_labels().len()];
        self.focused = 0;
        self.location_kind = LocationType::default();
    }

    pub fn close(&mut self) {
        self.mode = DialogMode::None;
        self.fields.clear();
        self.focused = 0;
    }

    pub fn is_open(&self) -> bool {
        self.mode != DialogMode::None
    }

    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            field.pop();
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Swap between the sign-in and register forms, carrying the e-mail over.
    pub fn toggle_auth_mode(&mut self) {
        let (next, email) = match self.mode {
            DialogMode::Login => (DialogMode::Register, self.field(0).to_string()),
            DialogMode::Register => (DialogMode::Login, self.field(1).to_string()),
            _ => return,
        };
        self.open(next);
        let email_idx = if next == DialogMode::Login { 0 } else { 1 };
        self.fields[email_idx] = email;
    }
}

#[derive(Default)]
pub struct HelpState {
    pub scroll_offset: usize,
}
