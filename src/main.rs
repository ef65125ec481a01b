use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{io, time::Duration};

use safesphere::app::App;
use safesphere::config::Config;
use safesphere::handlers::{handle_key_event, KeyAction};
use safesphere::logging;
use safesphere::markers::Layer;
use safesphere::scheduler::PollingScheduler;
use safesphere::ui::{
    render_dialog, render_header, render_help_panel, render_map, render_notifications,
    render_sidebar, render_status_bar, DialogRenderState, HeaderState, HelpPanelState,
    MapViewState, SidebarViewState, StatusBarState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    };

    let log_path = logging::init(&config.logging)?;
    tracing::info!("SafeSphere starting, logging to {}", log_path.display());

    let mut app = App::from_config(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("Exited with error: {:?}", err);
        eprintln!("{:?}", err);
    }

    tracing::info!("SafeSphere stopped");
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    // Draw once so the user sees something while the first load runs
    terminal.draw(|f| render_ui(f, app))?;
    app.bootstrap().await;

    let (mut scheduler, mut ticks) = if app.config.polling.enabled {
        let (scheduler, rx) = PollingScheduler::start(app.config.polling.interval());
        (Some(scheduler), Some(rx))
    } else {
        tracing::info!("Background refresh disabled in config");
        (None, None)
    };

    let result = loop {
        // Coalesce ticks that piled up while we were busy
        if let Some(rx) = ticks.as_mut() {
            let mut due = None;
            while let Ok(tick) = rx.try_recv() {
                due = Some(tick);
            }
            if let Some(tick) = due {
                tracing::debug!("Refresh tick #{}", tick.seq);
                app.run_refresh_cycle().await;
            }
        }

        app.notifications.prune();

        if let Err(e) = terminal.draw(|f| render_ui(f, app)) {
            break Err(e.into());
        }

        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let KeyAction::Quit = handle_key_event(app, key).await {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
    };

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop();
    }
    result
}

fn render_ui(f: &mut Frame, app: &App) {
    let theme = &app.config.theme;

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Sidebar + map
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    let header_state = HeaderState {
        user: app.current_user.as_ref(),
        safety: app.safety,
        weather: app.weather.as_ref(),
        last_sync: app.last_sync.map(|t| t.format("%H:%M:%S").to_string()),
    };
    render_header(f, &header_state, main_chunks[0], theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(main_chunks[1]);

    let sidebar_state = SidebarViewState {
        tab: app.sidebar.tab,
        selected: app.sidebar.selected(),
        friends: app.cache.friends(),
        requests: app.cache.friend_requests(),
        locations: app.cache.locations(),
        alerts: app.cache.alerts(),
    };
    render_sidebar(f, &sidebar_state, body[0], theme);

    let map_state = MapViewState {
        view: &app.map,
        markers: app.markers.surface().attached().collect(),
        selected: app.selected_marker(),
        hidden_layers: Layer::ALL
            .iter()
            .copied()
            .filter(|l| !app.markers.is_visible(*l))
            .collect(),
    };
    render_map(f, &map_state, body[1], theme);

    let status_state = StatusBarState {
        authenticated: app.api.is_authenticated(),
        dialog_open: app.is_dialog_open(),
        polling: app
            .config
            .polling
            .enabled
            .then(|| app.config.polling.interval().as_secs()),
    };
    render_status_bar(f, &status_state, main_chunks[2], theme);

    let notifications: Vec<_> = app.notifications.visible().collect();
    render_notifications(f, &notifications, f.area(), theme);

    // Help panel overlay
    if app.show_help {
        let help_state = HelpPanelState {
            scroll_offset: app.help.scroll_offset,
        };
        render_help_panel(f, &help_state, f.area(), theme);
    }

    // Dialog as topmost overlay
    if app.is_dialog_open() {
        let dialog_state = DialogRenderState {
            mode: app.dialog.mode,
            fields: &app.dialog.fields,
            focused: app.dialog.focused,
            location_kind: app.dialog.location_kind,
        };
        render_dialog(f, &dialog_state, f.area(), theme);
    }
}
