use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout as UiLayout, Rect as UiRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::{Frame, Terminal};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use treescape::crawler::{self, ScanStats};
use treescape::{
    FrontierConfig, FrontierController, FrontierError, LaidOutRect, NodeKind, Point, Rect,
    RootPolicy, ScanConfig,
};

/// Explore disk usage as an interactive treemap.
#[derive(Parser, Debug)]
#[command(name = "treescape", version)]
struct Args {
    /// Folder to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Show only the root rectangle until it is expanded
    #[arg(long)]
    collapsed_root: bool,

    /// Skip dot-files and dot-folders
    #[arg(long)]
    skip_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_links: bool,

    /// Append logs to this file; the terminal itself is used for drawing
    #[arg(long)]
    log_file: Option<PathBuf>,
}

struct App {
    controller: FrontierController,
    status: String,
    treemap_area: Option<UiRect>,
    should_quit: bool,
}

impl App {
    fn new(controller: FrontierController, stats: &ScanStats) -> Self {
        let mut status = format!(
            "Scanned {} files, {} dirs, {} in {}ms",
            stats.total_files,
            stats.total_dirs,
            format_size(controller.tree().total_size()),
            stats.duration_ms,
        );
        if !stats.unreadable.is_empty() {
            status.push_str(&format!(" ({} unreadable)", stats.unreadable.len()));
        }
        Self {
            controller,
            status,
            treemap_area: None,
            should_quit: false,
        }
    }

    fn report(&mut self, result: Result<(), FrontierError>) {
        if let Err(err) = result {
            self.status = err.to_string();
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') => {
                let result = self.controller.expand_selected();
                self.report(result);
            }
            KeyCode::Char('a') => {
                let result = self.controller.expand_all_selected();
                self.report(result);
            }
            KeyCode::Char('c') => {
                let result = self.controller.collapse_selected();
                self.report(result);
            }
            KeyCode::Char('x') => self.controller.collapse_all(),
            KeyCode::Char('p') | KeyCode::Backspace => {
                self.controller.select_parent();
            }
            KeyCode::Esc => self.controller.clear_selection(),
            _ => {}
        }
    }

    fn on_mouse(&mut self, event: MouseEvent) {
        let MouseEventKind::Down(MouseButton::Left) = event.kind else {
            return;
        };
        let Some(area) = self.treemap_area else {
            return;
        };
        if !point_in_rect(area, event.column, event.row) {
            return;
        }

        let point = Point::new(
            i32::from(event.column - area.x),
            i32::from(event.row - area.y),
        );
        if let Err(err) = self.controller.toggle_at(point) {
            self.status = err.to_string();
        }
    }
}

fn point_in_rect(rect: UiRect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

/// Terminal cells covered by a laid-out rectangle, inclusive on both ends.
fn tile_bounds_in_area(rect: Rect, area: UiRect) -> Option<(u16, u16, u16, u16)> {
    if rect.is_degenerate() || area.width == 0 || area.height == 0 {
        return None;
    }

    let max_x = i32::from(area.x) + i32::from(area.width) - 1;
    let max_y = i32::from(area.y) + i32::from(area.height) - 1;

    let x0 = (i32::from(area.x) + rect.x).clamp(i32::from(area.x), max_x);
    let y0 = (i32::from(area.y) + rect.y).clamp(i32::from(area.y), max_y);
    let x1 = (i32::from(area.x) + rect.right() - 1).clamp(i32::from(area.x), max_x);
    let y1 = (i32::from(area.y) + rect.bottom() - 1).clamp(i32::from(area.y), max_y);

    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0 as u16, y0 as u16, x1 as u16, y1 as u16))
}

fn format_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }
    format!("{:.1} {}", value, UNITS[unit_index])
}

fn tile_color(tile: &LaidOutRect, max_size: u64) -> Color {
    let ratio = if max_size == 0 {
        0.0
    } else {
        (tile.size as f32 / max_size as f32).clamp(0.0, 1.0)
    };

    match tile.kind {
        NodeKind::Folder => {
            let r = (35.0 + ratio * 65.0) as u8;
            let g = (95.0 + ratio * 95.0) as u8;
            let b = (145.0 + ratio * 85.0) as u8;
            Color::Rgb(r, g, b)
        }
        NodeKind::File => {
            let r = (55.0 + ratio * 120.0) as u8;
            let g = (85.0 + ratio * 95.0) as u8;
            let b = (95.0 + ratio * 70.0) as u8;
            Color::Rgb(r, g, b)
        }
    }
}

struct TreemapWidget<'a> {
    tiles: &'a [LaidOutRect],
    selected_path: Option<&'a Path>,
}

impl Widget for TreemapWidget<'_> {
    fn render(self, area: UiRect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                buf[(x, y)]
                    .set_char(' ')
                    .set_style(Style::default().bg(Color::Rgb(18, 18, 20)));
            }
        }

        // the root spans the whole area; skip it so the tiles stay readable
        let tiles = self.tiles.get(1..).unwrap_or_default();
        let max_size = tiles.iter().map(|tile| tile.size).max().unwrap_or(0);

        // pre-order: parents are painted before their children
        for tile in tiles {
            let Some((x0, y0, x1, y1)) = tile_bounds_in_area(tile.rect, area) else {
                continue;
            };

            let is_selected = self.selected_path == Some(tile.path.as_path());
            let bg = tile_color(tile, max_size);
            let border = Style::default()
                .fg(if is_selected {
                    Color::Rgb(246, 211, 101)
                } else {
                    Color::Rgb(224, 224, 224)
                })
                .bg(bg);

            for y in y0..=y1 {
                for x in x0..=x1 {
                    buf[(x, y)]
                        .set_char(' ')
                        .set_style(Style::default().bg(bg).fg(Color::White));
                }
            }

            for x in x0..=x1 {
                buf[(x, y0)].set_char('─').set_style(border);
                buf[(x, y1)].set_char('─').set_style(border);
            }
            for y in y0..=y1 {
                buf[(x0, y)].set_char('│').set_style(border);
                buf[(x1, y)].set_char('│').set_style(border);
            }
            if x1 > x0 && y1 > y0 {
                buf[(x0, y0)].set_char('┌').set_style(border);
                buf[(x1, y0)].set_char('┐').set_style(border);
                buf[(x0, y1)].set_char('└').set_style(border);
                buf[(x1, y1)].set_char('┘').set_style(border);
            }

            let label_width = x1.saturating_sub(x0).saturating_sub(1) as usize;
            if label_width >= 4 {
                let mut label: String = format!("{} {}", tile.name, format_size(tile.size));
                if label.chars().count() > label_width {
                    label = label.chars().take(label_width.saturating_sub(1)).collect();
                    label.push('…');
                }

                for (i, ch) in label.chars().enumerate() {
                    let x = x0.saturating_add(1).saturating_add(i as u16);
                    if x >= x1 {
                        break;
                    }
                    buf[(x, y0)].set_char(ch).set_style(
                        Style::default()
                            .fg(Color::White)
                            .bg(bg)
                            .add_modifier(Modifier::BOLD),
                    );
                }
            }
        }
    }
}

fn draw_ui(frame: &mut Frame, app: &mut App) {
    let root = frame.area();
    let rows = UiLayout::vertical([Constraint::Min(5), Constraint::Length(3)]).split(root);
    let split = UiLayout::horizontal([Constraint::Length(38), Constraint::Min(20)]).split(rows[0]);
    let (left, right) = (split[0], split[1]);

    let left_rows = UiLayout::vertical([Constraint::Min(6), Constraint::Length(8)]).split(left);

    let mut selection_lines = vec![Line::from(vec![
        Span::styled("Root: ", Style::default().fg(Color::Gray)),
        Span::raw(app.controller.tree().root_path().display().to_string()),
    ])];
    match app.controller.selection_info() {
        Some(info) => {
            selection_lines.push(Line::from(vec![
                Span::styled("Selected: ", Style::default().fg(Color::Gray)),
                Span::raw(info.path.display().to_string()),
            ]));
            selection_lines.push(Line::from(vec![
                Span::styled("Type: ", Style::default().fg(Color::Gray)),
                Span::raw(match info.kind {
                    NodeKind::File => "file",
                    NodeKind::Folder => "folder",
                }),
                Span::raw("  "),
                Span::styled("Size: ", Style::default().fg(Color::Gray)),
                Span::raw(format_size(info.size)),
            ]));
        }
        None => selection_lines.push(Line::from("Selected: (none)")),
    }
    selection_lines.push(Line::from(format!(
        "Expanded folders: {}",
        app.controller.expansion().len()
    )));

    frame.render_widget(
        Paragraph::new(selection_lines)
            .block(Block::default().title(" Selection ").borders(Borders::ALL)),
        left_rows[0],
    );

    let help_lines = vec![
        Line::from("Left click: select / unselect"),
        Line::from("e: expand    a: expand all"),
        Line::from("c: collapse  x: collapse all"),
        Line::from("p: parent    Esc: clear"),
        Line::from("q: quit"),
    ];
    frame.render_widget(
        Paragraph::new(help_lines).block(Block::default().title(" Controls ").borders(Borders::ALL)),
        left_rows[1],
    );

    let treemap_block = Block::default().title(" treescape ").borders(Borders::ALL);
    let treemap_inner = treemap_block.inner(right);
    frame.render_widget(treemap_block, right);
    app.treemap_area = Some(treemap_inner);

    let target = Rect::new(
        0,
        0,
        i32::from(treemap_inner.width),
        i32::from(treemap_inner.height),
    );
    let selected = app.controller.selected_path().map(Path::to_path_buf);
    let layout = app.controller.layout(target);
    frame.render_widget(
        TreemapWidget {
            tiles: layout.rects(),
            selected_path: selected.as_deref(),
        },
        treemap_inner,
    );

    let status_text = app
        .controller
        .selection_info()
        .map(|info| info.label)
        .unwrap_or_else(|| app.status.clone());
    frame.render_widget(
        Paragraph::new(status_text).block(Block::default().title(" Status ").borders(Borders::ALL)),
        rows[1],
    );
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| {
            draw_ui(frame, app);
        })?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                Event::Resize(_, _) => {}
                Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("treescape=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let scan_config = ScanConfig {
        skip_hidden: args.skip_hidden,
        follow_links: args.follow_links,
    };
    let frontier_config = FrontierConfig {
        root_policy: if args.collapsed_root {
            RootPolicy::Collapsible
        } else {
            RootPolicy::AlwaysExpanded
        },
    };

    let (tree, stats) = crawler::scan(&args.path, &scan_config).map_err(io::Error::other)?;
    let mut app = App::new(FrontierController::new(tree, frontier_config), &stats);

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app_result
}
