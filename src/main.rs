use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use landslide_dash::app::App;
use landslide_dash::cli::Args;
use landslide_dash::config::{Config, CONFIG_FILE};
use landslide_dash::map::MapRenderer;
use landslide_dash::records::Table;
use landslide_dash::{data, summary, ui};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    let mut config = Config::discover(args.config.as_deref())?;
    args.merge_into(&mut config);

    init_logging(&config, args.summary)?;
    info!("landslide-dash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Load before touching the terminal so errors print normally
    let path = &config.data.path;
    let table = Table::load(path)
        .with_context(|| format!("Failed to load events from {}", path.display()))?;

    if args.summary {
        let selectors = args.selectors(&table);
        print!("{}", summary::run(&table, &selectors, &config.charts));
        return Ok(());
    }

    let mut map_renderer = MapRenderer::new();
    map_renderer.show_borders = config.map.borders;
    data::load_backdrop(&mut map_renderer, &config.map.data_dir);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, table, map_renderer, &config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle --init-config: write a default landslide-dash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{CONFIG_FILE} already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("Failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default settings.");
    Ok(())
}

/// Summary mode logs to stderr. The dashboard owns the terminal, so it logs
/// only to a file, and not at all without one.
fn init_logging(config: &Config, summary: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    match (&config.logging.file, summary) {
        (_, true) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        (Some(file), false) => {
            let file = File::create(file)
                .with_context(|| format!("Failed to create log file: {}", file.display()))?;
            let _ = builder.with_writer(Mutex::new(file)).with_ansi(false).try_init();
        }
        (None, false) => {}
    }
    Ok(())
}

/// Handle mouse events for panning, zooming and hover
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the hover tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => app.begin_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Sidebar focus and controls
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Left => app.adjust(-1),
        KeyCode::Right => app.adjust(1),
        KeyCode::Char(' ') | KeyCode::Enter => app.activate(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.reset_filters(),

        // Pan with hjkl
        KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_map(),

        KeyCode::Char('b') | KeyCode::Char('B') => app.toggle_borders(),

        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    table: Table,
    map_renderer: MapRenderer,
    config: &Config,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(table, map_renderer, config.charts, size.width, size.height);

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("dashboard closed");
    Ok(())
}
