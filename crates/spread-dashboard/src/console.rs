//! Terminal console for the propagation dashboard.
//!
//! An interactive TUI showing the propagation map, the eight charts, the
//! timeline scrubber and the info lines. Slash commands select topics and
//! platforms, highlight posts and move the cursor. While the command line is
//! empty, Space, Left, Right and Esc drive the timeline directly.
//!
//! Launch with `spread-dashboard --console`.

use std::io::{self, Stdout};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame, Terminal,
};
use spread_view::{
    ChartKind, ChartScene, HighlightOutcome, InfoSummary, MapScene, TimelineKey, ViewSnapshot,
};

use crate::SharedDashboard;

const MAX_MESSAGES: usize = 500;
const BAR_WIDTH: usize = 16;
const LABEL_WIDTH: usize = 10;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Snapshot of dashboard state for one frame.
struct ConsoleSnapshot {
    info: InfoSummary,
    view: ViewSnapshot,
    scenes: Vec<ChartScene>,
    map: MapScene,
    highlight: Option<HighlightOutcome>,
}

/// The console TUI state.
struct DashboardConsole {
    dashboard: SharedDashboard,
    /// Current text in the input field.
    input: String,
    /// Cursor position within the input field, in chars.
    cursor_pos: usize,
    /// Command history for up/down arrow navigation.
    history: Vec<String>,
    history_pos: Option<usize>,
    /// Scroll offset for the post list of the map panel.
    map_scroll: u16,
    console_messages: Vec<(DateTime<Utc>, String, Color)>,
}

impl DashboardConsole {
    fn new(dashboard: SharedDashboard) -> Self {
        let mut console = Self {
            dashboard,
            input: String::new(),
            cursor_pos: 0,
            history: Vec::new(),
            history_pos: None,
            map_scroll: 0,
            console_messages: Vec::new(),
        };
        console.add_message(
            "Propagation dashboard ready. Type a post id and press Enter to highlight it.",
            Color::Cyan,
        );
        console.add_message(
            "Commands: /help, /topic, /platform, /seek, /play, /topics, /quit",
            Color::DarkGray,
        );
        console
    }

    async fn snapshot(&self) -> ConsoleSnapshot {
        let dashboard = self.dashboard.read().await;
        let view = dashboard.subscribe().borrow().clone();
        ConsoleSnapshot {
            info: dashboard.info(),
            view,
            scenes: dashboard.scenes(),
            map: dashboard.map(),
            highlight: dashboard.last_highlight().cloned(),
        }
    }

    async fn process_input(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }

        self.history.push(input.clone());
        self.history_pos = None;

        if input.starts_with('/') {
            self.process_command(&input).await;
        } else {
            self.highlight(&input).await;
        }

        self.input.clear();
        self.cursor_pos = 0;
    }

    async fn process_command(&mut self, cmd: &str) {
        let mut parts = cmd.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let args = parts.next().unwrap_or("").trim();

        match command {
            "/help" => {
                self.add_message("Available commands:", Color::Cyan);
                for line in [
                    "  <post id>          - Highlight the post's categories in every chart",
                    "  /highlight <post>  - Same as above",
                    "  /unhighlight       - Clear chart highlights",
                    "  /topic <id>        - Select a topic (again to deselect)",
                    "  /platform <code>   - Select a platform (again to deselect)",
                    "  /topics            - List topics",
                    "  /seek <0-100>      - Move the time cursor",
                    "  /play              - Start or pause playback",
                    "  /drag              - Toggle drag mode",
                    "  /clear             - Clear topic and platform selection",
                    "  /quit              - Exit the console",
                    "  Space / Left / Right / Esc with an empty command line drive the timeline",
                ] {
                    self.add_message(line, Color::White);
                }
            }
            "/topic" => {
                if args.is_empty() {
                    self.add_message("Usage: /topic <id>", Color::Yellow);
                    return;
                }
                let mut dashboard = self.dashboard.write().await;
                if dashboard.timeline().topic(args).is_none() {
                    drop(dashboard);
                    self.add_message(&format!("Unknown topic: {args}"), Color::Red);
                    return;
                }
                let selected = dashboard.select_topic(args);
                drop(dashboard);
                match selected {
                    Some(topic) => self.add_message(&format!("Topic selected: {topic}"), Color::Green),
                    None => self.add_message("Topic selection cleared", Color::Green),
                }
            }
            "/platform" => {
                if args.is_empty() {
                    self.add_message("Usage: /platform <code>", Color::Yellow);
                    return;
                }
                let selected = self.dashboard.write().await.select_platform(args);
                self.add_message(&format!("Platform: {selected}"), Color::Green);
            }
            "/highlight" => {
                if args.is_empty() {
                    self.add_message("Usage: /highlight <post id>", Color::Yellow);
                    return;
                }
                self.highlight(args).await;
            }
            "/unhighlight" => {
                self.dashboard.write().await.clear_highlights();
                self.add_message("Highlights cleared", Color::Green);
            }
            "/topics" => {
                let topics = self.dashboard.read().await.topics();
                if topics.is_empty() {
                    self.add_message("No topics loaded", Color::DarkGray);
                }
                for (topic_id, events, effect) in topics {
                    self.add_message(
                        &format!("  {topic_id}: {events} posts, total effect {effect:.2}"),
                        Color::White,
                    );
                }
            }
            "/seek" => match args.parse::<f64>() {
                Ok(cursor) => {
                    let mut dashboard = self.dashboard.write().await;
                    dashboard.stop_playback();
                    let cursor = dashboard.set_cursor(cursor);
                    drop(dashboard);
                    self.add_message(&format!("Cursor at {cursor:.1}"), Color::Green);
                }
                Err(_) => self.add_message("Usage: /seek <0-100>", Color::Yellow),
            },
            "/play" => {
                let playing = self.dashboard.write().await.toggle_playback();
                let msg = if playing { "Playback started" } else { "Playback paused" };
                self.add_message(msg, Color::Green);
            }
            "/drag" => {
                let enabled = self.dashboard.write().await.toggle_drag_mode();
                let msg = if enabled { "Drag mode on" } else { "Drag mode off" };
                self.add_message(msg, Color::Green);
            }
            "/clear" => {
                self.dashboard.write().await.clear_selection();
                self.add_message("Selection cleared", Color::Green);
            }
            _ => {
                self.add_message(
                    &format!("Unknown command: {command}. Type /help for commands."),
                    Color::Red,
                );
            }
        }
    }

    async fn highlight(&mut self, post_id: &str) {
        let outcome = self.dashboard.write().await.highlight_post(post_id);
        match outcome {
            HighlightOutcome::Applied {
                post_id,
                targets,
                summary,
                ..
            } => {
                let summary = summary.map(|s| format!(" ({s})")).unwrap_or_default();
                self.add_message(
                    &format!("Highlighted {post_id} in {} charts{summary}", targets.len()),
                    Color::Green,
                );
            }
            HighlightOutcome::OutsideTopic {
                post_id,
                selected_topic,
            } => {
                self.add_message(
                    &format!("{post_id} is outside the selected topic {selected_topic}"),
                    Color::Yellow,
                );
            }
            HighlightOutcome::UnknownPost { post_id } => {
                self.add_message(&format!("Unknown post: {post_id}"), Color::Red);
            }
        }
    }

    fn add_message(&mut self, msg: &str, color: Color) {
        self.console_messages
            .push((Utc::now(), msg.to_string(), color));
        if self.console_messages.len() > MAX_MESSAGES {
            self.console_messages.remove(0);
        }
    }

    fn render(&self, frame: &mut Frame, snapshot: &ConsoleSnapshot) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(12),   // Map, info and charts
                Constraint::Length(6), // Console output
                Constraint::Length(4), // Input
            ])
            .split(frame.area());

        self.render_status_bar(frame, outer[0], snapshot);
        self.render_main_area(frame, outer[1], snapshot);
        self.render_console_output(frame, outer[2]);
        self.render_input(frame, outer[3]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let block = Block::default()
            .title(" Propagation Dashboard ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let view = &snap.view;
        let time = snap
            .info
            .current_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let (play_label, play_color) = if view.playing {
            ("playing", Color::Green)
        } else {
            ("paused", Color::DarkGray)
        };

        let status_line = Line::from(vec![
            Span::styled("  Cursor: ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.1}", view.cursor), Style::default().fg(Color::White)),
            Span::styled("  |  Time: ", Style::default().fg(Color::Gray)),
            Span::styled(time, Style::default().fg(Color::Magenta)),
            Span::styled("  |  ", Style::default().fg(Color::Gray)),
            Span::styled(play_label, Style::default().fg(play_color)),
            Span::styled("  |  Topic: ", Style::default().fg(Color::Gray)),
            Span::styled(
                view.topic.clone().unwrap_or_else(|| "all".to_string()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled("  |  Platform: ", Style::default().fg(Color::Gray)),
            Span::styled(view.platform.to_string(), Style::default().fg(Color::LightCyan)),
            Span::styled("  |  Visible: ", Style::default().fg(Color::Gray)),
            Span::styled(view.visible.to_string(), Style::default().fg(Color::Green)),
            Span::styled(
                if view.drag_mode { "  |  drag" } else { "" },
                Style::default().fg(Color::LightRed),
            ),
        ]);

        frame.render_widget(Paragraph::new(status_line).block(block), area);
    }

    fn render_main_area(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(36), Constraint::Percentage(64)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(8)])
            .split(columns[0]);
        self.render_map(frame, left[0], snap);
        self.render_info(frame, left[1], snap);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(8)])
            .split(columns[1]);
        self.render_trend(frame, right[0], snap);
        self.render_chart_grid(frame, right[1], snap);
    }

    fn render_map(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let map = &snap.map;
        let block = Block::default()
            .title(format!(
                " Propagation Map ({} posts, {} links) ",
                map.nodes.len(),
                map.links.len()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        if map.is_empty() {
            let text = Paragraph::new(Line::from(Span::styled(
                "  No posts before the cursor.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        }

        let mut rows: Vec<Row> = Vec::new();
        for cluster in &map.clusters {
            rows.push(
                Row::new(vec![
                    Cell::from(Span::styled(
                        format!("  {}", cluster.label),
                        Style::default()
                            .fg(hex_color(&cluster.stroke))
                            .add_modifier(Modifier::BOLD),
                    )),
                    Cell::from(format!("{} posts", cluster.post_count)),
                    Cell::from(format!("effect {:.1}", cluster.total_effect)),
                ])
                .style(Style::default().fg(Color::White)),
            );
            for node in map.nodes.iter().filter(|n| n.platform == cluster.platform) {
                let marker = if node.stroke.width > 1.0 { "◆" } else { "●" };
                let style = if node.opacity >= 0.9 {
                    Style::default().fg(hex_color(&node.color))
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                rows.push(Row::new(vec![
                    Cell::from(Span::styled(format!("    {marker} {}", node.post_id), style)),
                    Cell::from(Span::styled(node.topic_id.clone(), style)),
                    Cell::from(Span::styled(format!("r {:.1}", node.radius), style)),
                ]));
            }
        }

        let visible_height = area.height.saturating_sub(2) as usize;
        let rows: Vec<Row> = rows
            .into_iter()
            .skip(self.map_scroll as usize)
            .take(visible_height)
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(25),
                Constraint::Percentage(30),
            ],
        )
        .block(block);
        frame.render_widget(table, area);
    }

    fn render_info(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let block = Block::default()
            .title(" Info ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightBlue));

        let mut lines: Vec<Line> = snap
            .info
            .lines()
            .into_iter()
            .map(|l| Line::from(Span::styled(format!("  {l}"), Style::default().fg(Color::White))))
            .collect();
        if let Some(HighlightOutcome::Applied {
            post_id, summary, ..
        }) = &snap.highlight
        {
            lines.push(Line::from(vec![
                Span::styled("  Highlight: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{post_id} {}", summary.as_deref().unwrap_or("")),
                    Style::default().fg(Color::Yellow),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_trend(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let Some(scene) = snap.scenes.iter().find(|s| s.kind() == ChartKind::TimeTrend) else {
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        let (title, lines) = match scene {
            ChartScene::Trend {
                title,
                points,
                max_count,
                color,
                scrub,
                ..
            } => {
                let counts: Vec<usize> = points.iter().map(|p| p.count).collect();
                (
                    format!(" {title} ({} days) - {} ", points.len(), scrub.hint),
                    vec![Line::from(Span::styled(
                        format!("  {}", sparkline(&counts, *max_count)),
                        Style::default().fg(hex_color(color)),
                    ))],
                )
            }
            other => (format!(" {} ", scene_title(other)), scene_lines(other)),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        frame.render_widget(Paragraph::new(lines).block(block), rows[0]);

        let (button, playing) = match scene {
            ChartScene::Trend { scrub, .. } => (scrub.button, scrub.playing),
            _ => ("", false),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(if playing {
                Color::Green
            } else {
                Color::Gray
            }))
            .ratio((snap.view.cursor / 100.0).clamp(0.0, 1.0))
            .label(format!("{button}  {:.1}", snap.view.cursor));
        frame.render_widget(gauge, rows[1]);
    }

    fn render_chart_grid(&self, frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
        let charts: Vec<&ChartScene> = snap
            .scenes
            .iter()
            .filter(|s| s.kind() != ChartKind::TimeTrend)
            .collect();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (row_index, row) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);
            for (col_index, cell) in cells.iter().enumerate() {
                let Some(scene) = charts.get(row_index * 2 + col_index) else {
                    continue;
                };
                let block = Block::default()
                    .title(format!(" {} ", scene_title(scene)))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                let paragraph = Paragraph::new(scene_lines(scene)).block(block);
                frame.render_widget(paragraph, *cell);
            }
        }
    }

    fn render_console_output(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Console Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.console_messages.len().saturating_sub(inner_height);

        let lines: Vec<Line> = self.console_messages[start..]
            .iter()
            .map(|(ts, msg, color)| {
                Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", ts.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.as_str(), Style::default().fg(*color)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Command (Enter = highlight post, /help = commands, /quit = exit) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let input_display = if self.input.is_empty() {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled(
                    "Space: play/pause | Left/Right: step | Esc: clear selection",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled(&self.input, Style::default().fg(Color::White)),
            ])
        };

        frame.render_widget(Paragraph::new(vec![input_display]).block(block), area);

        let cursor_x = area.x + 4 + self.cursor_pos as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Handle editing keys. Returns `true` if the console should exit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let input_len = self.input.chars().count();
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
            (KeyCode::Char(c), _) => {
                let at = self.byte_index(self.cursor_pos);
                self.input.insert(at, c);
                self.cursor_pos += 1;
            }
            (KeyCode::Backspace, _) => {
                if self.cursor_pos > 0 {
                    let at = self.byte_index(self.cursor_pos - 1);
                    self.input.remove(at);
                    self.cursor_pos -= 1;
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor_pos < input_len {
                    let at = self.byte_index(self.cursor_pos);
                    self.input.remove(at);
                }
            }
            (KeyCode::Left, _) => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
            }
            (KeyCode::Right, _) => {
                if self.cursor_pos < input_len {
                    self.cursor_pos += 1;
                }
            }
            (KeyCode::Home, _) => self.cursor_pos = 0,
            (KeyCode::End, _) => self.cursor_pos = input_len,
            (KeyCode::Esc, _) => {
                self.input.clear();
                self.cursor_pos = 0;
            }
            (KeyCode::Up, _) => {
                if !self.history.is_empty() {
                    let pos = match self.history_pos {
                        Some(p) if p > 0 => p - 1,
                        Some(p) => p,
                        None => self.history.len() - 1,
                    };
                    self.history_pos = Some(pos);
                    self.input = self.history[pos].clone();
                    self.cursor_pos = self.input.chars().count();
                }
            }
            (KeyCode::Down, _) => {
                if let Some(pos) = self.history_pos {
                    if pos + 1 < self.history.len() {
                        self.history_pos = Some(pos + 1);
                        self.input = self.history[pos + 1].clone();
                        self.cursor_pos = self.input.chars().count();
                    } else {
                        self.history_pos = None;
                        self.input.clear();
                        self.cursor_pos = 0;
                    }
                }
            }
            (KeyCode::PageUp, _) => {
                self.map_scroll = self.map_scroll.saturating_sub(5);
            }
            (KeyCode::PageDown, _) => {
                self.map_scroll = self.map_scroll.saturating_add(5);
            }
            _ => {}
        }
        false
    }
}

/// Timeline shortcut for a key pressed with an empty command line.
fn timeline_key(code: KeyCode) -> Option<TimelineKey> {
    match code {
        KeyCode::Char(' ') => Some(TimelineKey::Space),
        KeyCode::Left => Some(TimelineKey::Left),
        KeyCode::Right => Some(TimelineKey::Right),
        KeyCode::Esc => Some(TimelineKey::Escape),
        _ => None,
    }
}

/// Terminal color for a CSS color (`#rgb`, `#rrggbb` or `white`).
fn hex_color(css: &str) -> Color {
    if css.eq_ignore_ascii_case("white") {
        return Color::White;
    }
    let Some(hex) = css.strip_prefix('#') else {
        return Color::Gray;
    };
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let rgb = match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (expand(0), expand(1), expand(2))
        }
        6 => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
        _ => (None, None, None),
    };
    match rgb {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        short.push('…');
        short
    } else {
        text.to_string()
    }
}

fn sparkline(counts: &[usize], max: usize) -> String {
    counts
        .iter()
        .map(|&count| {
            if max == 0 || count == 0 {
                ' '
            } else {
                let level = (count * (SPARK_LEVELS.len() - 1)).div_ceil(max);
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

fn scene_title(scene: &ChartScene) -> &str {
    match scene {
        ChartScene::Empty { title, .. }
        | ChartScene::Bars { title, .. }
        | ChartScene::Wedges { title, .. }
        | ChartScene::Trend { title, .. } => title,
    }
}

/// Text rendition of a chart: one line per bar or wedge.
fn scene_lines(scene: &ChartScene) -> Vec<Line<'static>> {
    match scene {
        ChartScene::Empty { message, .. } => vec![Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::DarkGray),
        ))],
        ChartScene::Bars {
            max_value, bars, ..
        } => bars
            .iter()
            .map(|bar| {
                let filled = if *max_value == 0 {
                    0
                } else {
                    (bar.value * BAR_WIDTH).div_ceil(*max_value)
                };
                let mut style = Style::default().fg(hex_color(&bar.color));
                if bar.stroke.is_some() {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                } else if bar.opacity < 0.5 {
                    style = Style::default().fg(Color::DarkGray);
                }
                Line::from(vec![
                    Span::styled(
                        format!("  {:<width$} ", truncate(&bar.label, LABEL_WIDTH), width = LABEL_WIDTH),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled("█".repeat(filled), style),
                    Span::styled(format!(" {}", bar.value), Style::default().fg(Color::White)),
                ])
            })
            .collect(),
        ChartScene::Wedges { wedges, .. } => wedges
            .iter()
            .map(|wedge| {
                let highlighted = wedge.stroke.width > 2.0;
                let dimmed = wedge.opacity < 0.5;
                let text_style = match (highlighted, dimmed) {
                    (true, _) => Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                    (false, true) => Style::default().fg(Color::DarkGray),
                    (false, false) => Style::default().fg(Color::Gray),
                };
                Line::from(vec![
                    Span::styled("  ■ ", Style::default().fg(hex_color(&wedge.color))),
                    Span::styled(
                        format!(
                            "{} {:.1}% ({})",
                            truncate(&wedge.label, LABEL_WIDTH),
                            wedge.percentage,
                            wedge.value
                        ),
                        text_style,
                    ),
                ])
            })
            .collect(),
        ChartScene::Trend {
            points, max_count, ..
        } => {
            let counts: Vec<usize> = points.iter().map(|p| p.count).collect();
            vec![Line::from(format!("  {}", sparkline(&counts, *max_count)))]
        }
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the console event loop until `/quit` or Ctrl+C.
pub async fn run_console(dashboard: SharedDashboard) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("The dashboard console requires a terminal (TTY)."));
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut console = DashboardConsole::new(dashboard);
    let tick_rate = Duration::from_millis(100);

    loop {
        let snapshot = console.snapshot().await;
        terminal.draw(|frame| console.render(frame, &snapshot))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        if key_event.code == KeyCode::Enter {
            let trimmed = console.input.trim();
            if trimmed == "/quit" || trimmed == "/exit" || trimmed == "/q" {
                break;
            }
            console.process_input().await;
        } else if let Some(key) = console
            .input
            .is_empty()
            .then(|| timeline_key(key_event.code))
            .flatten()
        {
            console.dashboard.write().await.handle_key(key);
        } else if console.handle_key(key_event.code, key_event.modifiers) {
            break;
        }
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}
