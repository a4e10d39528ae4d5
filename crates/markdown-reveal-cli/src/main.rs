mod host;
mod view;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use host::TerminalHost;
use markdown_reveal_config::Config;
use markdown_reveal_engine::{BatchSizeChange, ManualHost, PropertyMap, RenderSession, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};
use std::{
    cell::Cell,
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
    rc::Rc,
    time::{Duration, Instant},
};

/// Longest the event loop blocks when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

struct App {
    path: PathBuf,
    session: RenderSession<TerminalHost>,
    last_change: Rc<Cell<Option<BatchSizeChange>>>,
    lines: Vec<Line<'static>>,
    scroll: u16,
    /// Last failure, shown in place of the help line.
    status: Option<String>,
}

impl App {
    fn new(path: PathBuf, config: &Config) -> Result<Self> {
        let document = io::load_document(&path)?;
        let mut session = RenderSession::new(TerminalHost::new(), config.batch_config())
            .with_base_attributes(
                PropertyMap::new().with("class", config.render.root_class.clone()),
            );

        let last_change = Rc::new(Cell::new(None));
        let sink = last_change.clone();
        session
            .scheduler_mut()
            .on_batch_size_change(move |change| sink.set(Some(*change)));
        session.set_document(document);

        let mut app = Self {
            path,
            session,
            last_change,
            lines: Vec::new(),
            scroll: 0,
            status: None,
        };
        app.refresh();
        Ok(app)
    }

    fn refresh(&mut self) {
        self.lines = view::document_lines(&self.session.render());
    }

    /// Deliver wake-ups that came due while waiting for input.
    fn deliver_due_wakes(&mut self) {
        let due = self
            .session
            .scheduler_mut()
            .host_mut()
            .take_due(Instant::now());
        if due.is_empty() {
            return;
        }
        for (handle, fired) in due {
            self.session.on_wake(handle, fired);
        }
        if let Some(output) = self.session.latest() {
            self.lines = view::document_lines(output);
        }
    }

    /// Re-read the file. Growth keeps what is already revealed.
    fn reload(&mut self) {
        match io::load_document(&self.path) {
            Ok(document) => {
                self.session.set_document(document);
                self.status = None;
                self.refresh();
            }
            Err(e) => self.status = Some(format!("Reload failed: {e}")),
        }
    }

    fn replay(&mut self) {
        let scheduler = self.session.scheduler_mut();
        scheduler.reset();
        scheduler.initialize();
        self.scroll = 0;
        self.refresh();
    }

    fn next_batch(&mut self) {
        self.session.scheduler_mut().render_next_batch();
    }

    fn pause(&mut self) {
        self.session.scheduler_mut().cancel_schedule();
    }

    fn scroll_down(&mut self) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll = (self.scroll as usize + 1).min(max) as u16;
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();

    let (path, html_target) = match args.as_slice() {
        [_, path] => (PathBuf::from(path), None),
        [_, path, flag] if flag == "--html" => (PathBuf::from(path), Some(None)),
        [_, path, flag, out] if flag == "--html" => {
            (PathBuf::from(path), Some(Some(PathBuf::from(out))))
        }
        _ => usage(&args[0]),
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    if let Some(output) = html_target {
        return export_html(&path, output, &config);
    }

    // Fail before touching the terminal
    if let Err(e) = io::read_markdown(&path) {
        eprintln!("Error: Cannot open '{}': {e}", path.display());
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new(path, &config).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file.md> [--html [output.html]]");
    process::exit(1);
}

/// Render the whole document at once and print or save it.
fn export_html(path: &Path, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let document = io::load_document(path)?;
    let mut session = RenderSession::new(ManualHost::new(), config.batch_config())
        .with_base_attributes(PropertyMap::new().with("class", config.render.root_class.clone()));
    session.set_document(document);
    let html = session.run_to_completion().to_html();

    let target = output.or_else(|| {
        let dir = config.render.export_dir.as_ref()?;
        let stem = path.file_stem()?;
        Some(dir.join(stem).with_extension("html"))
    });

    match target {
        Some(target) => {
            io::write_output(&target, &html)?;
            log::info!("wrote {}", target.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .session
            .scheduler()
            .host()
            .time_to_next_wake(Instant::now())
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
                KeyCode::Char('n') => app.next_batch(),
                KeyCode::Char('p') => app.pause(),
                KeyCode::Char('r') => app.replay(),
                KeyCode::Char('l') => app.reload(),
                _ => {}
            }
        }

        app.deliver_due_wakes();
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    // Progress panel
    let scheduler = app.session.scheduler();
    let mut label = format!(
        "{}/{} nodes | batch {}",
        scheduler.revealed_count(),
        scheduler.total(),
        scheduler.adaptive_batch_size()
    );
    if let Some(change) = app.last_change.get()
        && let Some(elapsed) = change.elapsed
    {
        label.push_str(&format!(" ({:.1}ms)", elapsed.as_secs_f64() * 1000.0));
    }
    if scheduler.host().is_armed() {
        label.push_str(" | revealing");
    }

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.session.render_progress())
        .label(label);
    f.render_widget(gauge, chunks[0]);

    // Content panel
    let title = app
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Document".to_string());
    let content_text = if app.lines.is_empty() {
        vec![Line::from("Nothing revealed yet")]
    } else {
        app.lines.clone()
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(ratatui::widgets::Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(content, chunks[1]);

    // Instructions, or the last failure
    let help_text = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("↑/k ↓/j: Scroll | "),
            Span::raw("n: Next batch | p: Pause | r: Replay | l: Reload"),
        ]),
    };
    f.render_widget(Paragraph::new(vec![help_text]), chunks[2]);
}
