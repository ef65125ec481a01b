pub mod dialog;
pub mod header;
pub mod help;
pub mod keybindings;
pub mod map;
pub mod notifications;
pub mod sidebar;
pub mod status_bar;
pub mod styles;
pub mod theme;

pub use dialog::{render_dialog, DialogRenderState};
pub use header::{render_header, HeaderState};
pub use help::{render_help_panel, HelpPanelState};
pub use keybindings::help_content_height;
pub use map::{render_map, MapViewState};
pub use notifications::render_notifications;
pub use sidebar::{render_sidebar, SidebarViewState};
pub use status_bar::{render_status_bar, StatusBarState};
pub use theme::Theme;
