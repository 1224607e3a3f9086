mod backend;
mod highlight;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rst_lit_config::Config;
use rst_lit_engine::{
    CodeStyle, Host, IdleScheduler, MarkupOptions, Session, SettingsHandle, StyleTag, TitleStyle,
    VisualDirective, session::NoopOverlays,
};
use std::{
    cell::RefCell,
    env,
    io::stdout,
    path::PathBuf,
    process,
    rc::Rc,
    time::{Duration, Instant},
};

use backend::InterpreterBackend;
use highlight::TreeSitterHighlighter;

/// Debounce timer driven from the event loop's poll timeout.
struct PollScheduler {
    deadline: Rc<RefCell<Option<Instant>>>,
}

impl IdleScheduler for PollScheduler {
    fn schedule(&mut self, delay: Duration) {
        *self.deadline.borrow_mut() = Some(Instant::now() + delay);
    }
}

struct App {
    session: Session,
    deadline: Rc<RefCell<Option<Instant>>>,
    file_name: String,
    scroll: usize,
    status: String,
}

impl App {
    fn new(path: PathBuf, config: Config) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        let settings = SettingsHandle::new(MarkupOptions {
            hide_title_markup: config.hide_title_markup,
            hide_quotes: config.hide_quotes,
            reveal_at_point: config.reveal_at_point,
            title_styles: config.title_style_chars(),
        });

        let deadline = Rc::new(RefCell::new(None));
        let host = Host {
            highlighter: Box::new(TreeSitterHighlighter::new()?),
            exec: Box::new(InterpreterBackend::new(config.interpreter.clone())),
            overlays: Box::new(NoopOverlays),
            scheduler: Box::new(PollScheduler {
                deadline: deadline.clone(),
            }),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            session: Session::new(&text, settings, host),
            deadline,
            file_name,
            scroll: 0,
            status: String::from("ready"),
        })
    }

    fn move_horizontal(&mut self, delta: isize) {
        let text = self.session.text();
        let pos = self.session.cursor();
        let next = if delta < 0 {
            text[..pos].char_indices().next_back().map(|(i, _)| i)
        } else {
            text[pos..].chars().next().map(|c| pos + c.len_utf8())
        };
        if let Some(next) = next {
            self.session.cursor_moved(next);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let text = self.session.text();
        let lines = buffer_lines(&text);
        let (line_idx, col) = locate(&lines, self.session.cursor());
        let target_idx = line_idx
            .saturating_add_signed(delta)
            .min(lines.len().saturating_sub(1));
        let (start, body) = lines[target_idx];
        let byte_col = body
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        self.session.cursor_moved(start + byte_col);
    }

    fn eval(&mut self, whole_block: bool) {
        self.status = match self.session.eval_snippet_inline(whole_block) {
            Ok(()) => String::from("evaluated"),
            Err(e) => format!("error: {e}"),
        };
    }

    fn copy_to_repl(&mut self) {
        self.status = match self.session.copy_snippet_to_repl() {
            Ok(()) => String::from("sent to interpreter"),
            Err(e) => format!("error: {e}"),
        };
    }

    fn describe_toggles(&self) -> String {
        let options = self.session.settings().options();
        format!(
            "hide titles: {} | hide quotes: {} | reveal: {}",
            options.hide_title_markup, options.hide_quotes, options.reveal_at_point
        )
    }

    fn idle_due(&self) -> bool {
        matches!(*self.deadline.borrow(), Some(d) if Instant::now() >= d)
    }

    fn fire_idle(&mut self) {
        *self.deadline.borrow_mut() = None;
        self.session.idle();
    }

    fn ensure_visible(&mut self, height: usize) {
        let text = self.session.text();
        let lines = buffer_lines(&text);
        let (line_idx, _) = locate(&lines, self.session.cursor());
        if line_idx < self.scroll {
            self.scroll = line_idx;
        } else if height > 0 && line_idx >= self.scroll + height {
            self.scroll = line_idx + 1 - height;
        }
    }
}

/// Buffer lines as (start offset, body without newline).
fn buffer_lines(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for seg in text.split_inclusive('\n') {
        out.push((start, seg.trim_end_matches('\n')));
        start += seg.len();
    }
    if out.is_empty() {
        out.push((0, ""));
    }
    out
}

/// Line index and character column of a byte position.
fn locate(lines: &[(usize, &str)], pos: usize) -> (usize, usize) {
    for (idx, (start, body)) in lines.iter().enumerate().rev() {
        if pos >= *start {
            let local = (pos - start).min(body.len());
            let col = body[..local].chars().count();
            return (idx, col);
        }
    }
    (0, 0)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <literate-source-file>", args[0]);
        process::exit(1);
    }
    let path = PathBuf::from(&args[1]);

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: failed to load config file: {e}");
            process::exit(1);
        }
    };

    let mut app = match App::new(path, config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .deadline
            .borrow()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(250))
            .min(Duration::from_millis(250));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Left | KeyCode::Char('h') => app.move_horizontal(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.move_horizontal(1),
                    KeyCode::Up | KeyCode::Char('k') => app.move_vertical(-1),
                    KeyCode::Down | KeyCode::Char('j') => app.move_vertical(1),
                    KeyCode::Char('t') => {
                        app.session.toggle_title_markup();
                        app.status = app.describe_toggles();
                    }
                    KeyCode::Char('`') => {
                        app.session.toggle_quotes_markup();
                        app.status = app.describe_toggles();
                    }
                    KeyCode::Char('m') => {
                        app.session.hide_all_markup();
                        app.status = app.describe_toggles();
                    }
                    KeyCode::Char('c') => {
                        app.session.cycle_title();
                        app.status = String::from("cycled title");
                    }
                    KeyCode::Char('e') => app.eval(false),
                    KeyCode::Char('E') => app.eval(true),
                    KeyCode::Char('y') => app.copy_to_repl(),
                    _ => {}
                }
            }
        }

        if app.idle_due() {
            app.fire_idle();
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(f.area());

    let height = chunks[0].height.saturating_sub(2) as usize;
    app.ensure_visible(height);

    let text = app.session.text();
    let directives = app.session.directives();
    let cursor = app.session.cursor();
    let overlays = app.session.overlays().clone();

    let mut lines: Vec<Line> = Vec::new();
    for (start, body) in buffer_lines(&text) {
        lines.push(styled_line(body, start, &directives, cursor));
        let line_end = start + body.len();
        for output in overlays.range(start..=line_end).map(|(_, v)| v) {
            for out_line in output.lines() {
                lines.push(Line::from(Span::styled(
                    format!("=> {out_line}"),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    let content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.file_name.clone()),
        )
        .scroll((app.scroll as u16, 0));
    f.render_widget(content, chunks[0]);

    let help = Line::from(vec![
        Span::raw("q: quit | t: titles | `: quotes | m: hide all | c: cycle | "),
        Span::raw("e/E: eval snippet/block | y: to interpreter | "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(Paragraph::new(vec![help]), chunks[1]);
}

/// Renders one buffer line, dropping hidden spans and marking the cursor.
fn styled_line(
    body: &str,
    base: usize,
    directives: &[VisualDirective],
    cursor: usize,
) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;

    let mut flush = |run: &mut String, style: Option<Style>, spans: &mut Vec<Span>| {
        if !run.is_empty() {
            spans.push(Span::styled(
                std::mem::take(run),
                style.unwrap_or_default(),
            ));
        }
    };

    for (i, ch) in body.char_indices() {
        let abs = base + i;
        let mut style = Style::default();
        let mut hidden = false;
        for d in directives {
            if d.span.contains(abs) {
                style = style_for_tag(d.style);
                hidden = d.hidden;
            }
        }
        let at_cursor = abs == cursor;
        if hidden && !at_cursor {
            continue;
        }
        if at_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if run_style != Some(style) {
            flush(&mut run, run_style, &mut spans);
            run_style = Some(style);
        }
        run.push(ch);
    }
    flush(&mut run, run_style, &mut spans);

    // Cursor resting at the end of the line.
    if cursor == base + body.len() {
        spans.push(Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ));
    }

    Line::from(spans)
}

fn style_for_tag(tag: StyleTag) -> Style {
    match tag {
        StyleTag::Title(TitleStyle::Level1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        StyleTag::Title(TitleStyle::Level2) => {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        }
        StyleTag::Title(TitleStyle::Level3) => Style::default().fg(Color::Cyan),
        StyleTag::Title(TitleStyle::Plain) => Style::default().add_modifier(Modifier::BOLD),
        StyleTag::TitleMarkup | StyleTag::ProseMarker | StyleTag::QuoteDelimiter => {
            Style::default().fg(Color::DarkGray)
        }
        StyleTag::UnderlineThin => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::UNDERLINED),
        StyleTag::Prose => Style::default().fg(Color::Green),
        StyleTag::DoctestMarker => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        StyleTag::DoctestCode => Style::default().fg(Color::White),
        StyleTag::LiteralSingle => Style::default().fg(Color::Magenta),
        StyleTag::LiteralDouble => Style::default().fg(Color::LightMagenta),
        StyleTag::Code(code) => match code {
            CodeStyle::Keyword => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            CodeStyle::Ident => Style::default().fg(Color::White),
            CodeStyle::Literal => Style::default().fg(Color::Red),
            CodeStyle::Comment => Style::default().fg(Color::DarkGray),
            CodeStyle::Operator => Style::default().fg(Color::Yellow),
            CodeStyle::Punct => Style::default().fg(Color::Gray),
        },
    }
}
