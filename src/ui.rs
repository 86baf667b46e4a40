use crate::commands::generate_id;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use roadmap::board::{layout_board, layout_column, BoardLayout, ColumnLayout};
use roadmap::calendar::{index_to_date, period_label, ViewMode};
use roadmap::layout::{LayoutMetrics, PositionedItem};
use roadmap::model::{ItemId, PillarColor, Roadmap, RoadmapItem};
use roadmap::reposition::MoveRequest;
use roadmap::status::{item_effective_status, Status};
use roadmap::storage::{save_board, BoardLocation};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const LABEL_WIDTH: u16 = 10;
const HEADER_HEIGHT: u16 = 3;
const MIN_ROWS_PER_PERIOD: u16 = 2;

pub fn run(
    roadmap: Roadmap,
    location: BoardLocation,
    view: ViewMode,
    today: NaiveDate,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(roadmap, location, view, today);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    roadmap: Roadmap,
    location: BoardLocation,
    view: ViewMode,
    today: NaiveDate,
    project: Option<String>,
    cursor_period: usize,
    cursor_pillar: usize,
    cell_item: usize,
    period_offset: usize,
    last_save: Instant,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Menu { target: MenuTarget, selected: usize },
    Form { kind: FormKind, form: ItemForm },
    Moving { item_id: ItemId },
    ConfirmDelete { item_id: ItemId },
}

/// What a context menu was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuTarget {
    Cell { period: usize, pillar: usize },
    Item { id: ItemId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddItem,
    UpdateDetails,
    UpdateStatus,
    UpdateTime,
    UpdateAssignees,
    Duplicate,
    BumpProgress,
    Delete,
}

const CELL_ACTIONS: &[MenuAction] = &[MenuAction::AddItem];
const ITEM_ACTIONS: &[MenuAction] = &[
    MenuAction::UpdateDetails,
    MenuAction::UpdateStatus,
    MenuAction::UpdateTime,
    MenuAction::UpdateAssignees,
    MenuAction::Duplicate,
    MenuAction::BumpProgress,
    MenuAction::Delete,
];

impl MenuTarget {
    fn actions(&self) -> &'static [MenuAction] {
        match self {
            MenuTarget::Cell { .. } => CELL_ACTIONS,
            MenuTarget::Item { .. } => ITEM_ACTIONS,
        }
    }
}

impl MenuAction {
    fn label(&self) -> &'static str {
        match self {
            MenuAction::AddItem => "Add New Item",
            MenuAction::UpdateDetails => "Update Details",
            MenuAction::UpdateStatus => "Update Status",
            MenuAction::UpdateTime => "Update Time",
            MenuAction::UpdateAssignees => "Update Assignee",
            MenuAction::Duplicate => "Duplicate",
            MenuAction::BumpProgress => "Bump Progress",
            MenuAction::Delete => "Delete Item",
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, MenuAction::Delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormKind {
    Add { period: usize, pillar: usize },
    Edit { id: ItemId },
}

struct ItemForm {
    title: FieldValue,
    description: FieldValue,
    tag: FieldValue,
    assignees: FieldValue,
    progress: FieldValue,
    status: FieldValue,
    start: FieldValue,
    end: FieldValue,
    field: FormField,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Description,
    Tag,
    Assignees,
    Progress,
    Status,
    Start,
    End,
}

const FORM_FIELDS: [FormField; 8] = [
    FormField::Title,
    FormField::Description,
    FormField::Tag,
    FormField::Assignees,
    FormField::Progress,
    FormField::Status,
    FormField::Start,
    FormField::End,
];

impl FormField {
    fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Tag => "Tag",
            FormField::Assignees => "Assignees",
            FormField::Progress => "Progress %",
            FormField::Status => "Status",
            FormField::Start => "Start (YYYY-MM-DD)",
            FormField::End => "End (YYYY-MM-DD)",
        }
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    fn optional(&self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

struct Palette {
    background: Color,
    surface: Color,
    text: Color,
    muted: Color,
    grid: Color,
}

fn palette(dark: bool) -> Palette {
    if dark {
        Palette {
            background: Color::Rgb(16, 18, 24),
            surface: Color::Rgb(24, 28, 38),
            text: Color::White,
            muted: Color::Gray,
            grid: Color::Rgb(40, 44, 56),
        }
    } else {
        Palette {
            background: Color::Rgb(246, 247, 249),
            surface: Color::White,
            text: Color::Black,
            muted: Color::DarkGray,
            grid: Color::Rgb(210, 214, 222),
        }
    }
}

impl App {
    fn new(roadmap: Roadmap, location: BoardLocation, view: ViewMode, today: NaiveDate) -> Self {
        let status = format!("Loaded roadmap from {}", location.path.display());
        App {
            roadmap,
            location,
            view,
            today,
            project: None,
            cursor_period: 0,
            cursor_pillar: 0,
            cell_item: 0,
            period_offset: 0,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Menu { .. } => self.handle_menu_key(key),
            Mode::Form { .. } => self.handle_form_key(key),
            Mode::Moving { .. } => self.handle_moving_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => self.set_view(ViewMode::Week),
            KeyCode::Char('2') => self.set_view(ViewMode::Month),
            KeyCode::Char('3') => self.set_view(ViewMode::Quarter),
            KeyCode::Char('t') => self.toggle_theme()?,
            KeyCode::Char('f') => self.cycle_project_filter(),
            KeyCode::Tab => self.next_cell_item(),
            KeyCode::Enter | KeyCode::Char('a') => self.open_menu(),
            KeyCode::Char('n') => self.open_add_form(self.cursor_period, self.cursor_pillar),
            KeyCode::Char('e') => self.with_selected(|app, id| {
                app.open_edit_form(id, FormField::Title);
                Ok(())
            })?,
            KeyCode::Char('s') => self.with_selected(|app, id| app.cycle_status(id))?,
            KeyCode::Char('p') => self.with_selected(|app, id| app.bump_progress(id))?,
            KeyCode::Char('c') => self.with_selected(|app, id| app.duplicate(id))?,
            KeyCode::Char('d') => self.with_selected(|app, id| {
                app.confirm_delete(id);
                Ok(())
            })?,
            KeyCode::Char('m') => self.with_selected(|app, id| {
                app.start_moving(id);
                Ok(())
            })?,
            _ => self.move_cursor(key),
        }
        Ok(false)
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<bool> {
        let (target, selected) = match &self.mode {
            Mode::Menu { target, selected } => (target.clone(), *selected),
            _ => return Ok(false),
        };
        let actions = target.actions();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.mode = Mode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.mode = Mode::Menu {
                    target,
                    selected: selected.saturating_sub(1),
                };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.mode = Mode::Menu {
                    target,
                    selected: (selected + 1).min(actions.len().saturating_sub(1)),
                };
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                if let Some(action) = actions.get(selected) {
                    self.run_menu_action(&target, *action)?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn run_menu_action(&mut self, target: &MenuTarget, action: MenuAction) -> Result<()> {
        match (target, action) {
            (MenuTarget::Cell { period, pillar }, MenuAction::AddItem) => {
                self.open_add_form(*period, *pillar)
            }
            (MenuTarget::Item { id }, MenuAction::UpdateDetails) => {
                self.open_edit_form(id, FormField::Title)
            }
            (MenuTarget::Item { id }, MenuAction::UpdateStatus) => self.cycle_status(id)?,
            (MenuTarget::Item { id }, MenuAction::UpdateTime) => self.start_moving(id),
            (MenuTarget::Item { id }, MenuAction::UpdateAssignees) => {
                self.open_edit_form(id, FormField::Assignees)
            }
            (MenuTarget::Item { id }, MenuAction::Duplicate) => self.duplicate(id)?,
            (MenuTarget::Item { id }, MenuAction::BumpProgress) => self.bump_progress(id)?,
            (MenuTarget::Item { id }, MenuAction::Delete) => self.confirm_delete(id),
            _ => {}
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close_form = false;
        if let Mode::Form { kind, form } = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                KeyCode::Left => form.active_field_mut().move_left(),
                KeyCode::Right => form.active_field_mut().move_right(),
                KeyCode::Backspace => form.active_field_mut().backspace(),
                KeyCode::Enter => close_form = self.try_submit(kind, form)?,
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        form.active_field_mut().insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_moving_key(&mut self, key: KeyEvent) -> Result<bool> {
        let item_id = match &self.mode {
            Mode::Moving { item_id } => item_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Move canceled".into();
            }
            KeyCode::Enter | KeyCode::Char('m') => {
                self.mode = Mode::Normal;
                let request = MoveRequest {
                    item_id: item_id.clone(),
                    target_pillar: self.cursor_pillar,
                    target_index: self.cursor_period as f64,
                };
                match self.roadmap.apply_move(&request, self.view) {
                    Ok(moved) => {
                        let message = format!(
                            "Moved {} to {} → {}",
                            item_id, moved.start_date, moved.end_date
                        );
                        info!(item = %item_id, to = request.target_index, pillar = request.target_pillar, "moved item");
                        self.persist(message)?;
                        self.select_item(&item_id);
                    }
                    Err(err) => self.status = format!("Move failed: {}", err),
                }
            }
            _ => self.move_cursor(key),
        }
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let item_id = match &self.mode {
            Mode::ConfirmDelete { item_id } => item_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                match self.roadmap.remove_item(&item_id) {
                    Ok(_) => {
                        self.cell_item = 0;
                        self.persist(format!("Deleted {}", item_id))?;
                    }
                    Err(err) => self.status = format!("Delete failed: {}", err),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn move_cursor(&mut self, key: KeyEvent) {
        let periods = self.view.visible_periods();
        let pillars = self.roadmap.pillars.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor_period = self.cursor_period.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor_period + 1 < periods {
                    self.cursor_period += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor_pillar = self.cursor_pillar.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.cursor_pillar + 1 < pillars {
                    self.cursor_pillar += 1;
                }
            }
            _ => return,
        }
        self.cell_item = 0;
    }

    fn set_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.status = format!("Switched to {} view", view);
            debug!(%view, "switched view");
        }
        self.cursor_period = self
            .cursor_period
            .min(view.visible_periods().saturating_sub(1));
        self.period_offset = 0;
        self.cell_item = 0;
    }

    fn toggle_theme(&mut self) -> Result<()> {
        self.roadmap.settings.dark = !self.roadmap.settings.dark;
        let label = if self.roadmap.settings.dark {
            "dark"
        } else {
            "light"
        };
        self.persist(format!("Switched to {} theme", label))
    }

    fn cycle_project_filter(&mut self) {
        let ids: Vec<&str> = self
            .roadmap
            .projects
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        if ids.is_empty() {
            self.status = "No projects defined".into();
            return;
        }
        let next = match self.project.as_deref() {
            None => Some(ids[0].to_string()),
            Some(current) => ids
                .iter()
                .position(|id| *id == current)
                .and_then(|pos| ids.get(pos + 1))
                .map(|id| id.to_string()),
        };
        self.status = match &next {
            Some(id) => format!("Showing project {}", id),
            None => "Showing all projects".into(),
        };
        self.project = next;
        self.cell_item = 0;
    }

    fn layout(&self, metrics: LayoutMetrics) -> Result<BoardLayout> {
        Ok(layout_board(
            &self.roadmap,
            self.view,
            metrics,
            self.project.as_deref(),
        )?)
    }

    fn cell_items(&self) -> Vec<ItemId> {
        match layout_column(
            &self.roadmap,
            self.cursor_pillar,
            self.view,
            LayoutMetrics::default(),
            self.project.as_deref(),
        ) {
            Ok(column) => column
                .items_at(self.cursor_period)
                .into_iter()
                .map(|p| p.item.id.clone())
                .collect(),
            Err(err) => {
                warn!(error = %err, "could not lay out column");
                Vec::new()
            }
        }
    }

    fn selected_item_id(&self) -> Option<ItemId> {
        let items = self.cell_items();
        items.get(self.cell_item.min(items.len().saturating_sub(1))).cloned()
    }

    fn selected_item(&self) -> Option<&RoadmapItem> {
        self.selected_item_id()
            .and_then(|id| self.roadmap.find_item(&id))
    }

    fn with_selected<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut App, &str) -> Result<()>,
    {
        match self.selected_item_id() {
            Some(id) => f(self, &id),
            None => {
                self.status = "No item at the cursor".into();
                Ok(())
            }
        }
    }

    fn select_item(&mut self, id: &str) {
        if let Some(item) = self.roadmap.find_item(id) {
            self.cursor_pillar = item.pillar;
        }
        self.cell_item = self
            .cell_items()
            .iter()
            .position(|other| other == id)
            .unwrap_or(0);
    }

    fn next_cell_item(&mut self) {
        let count = self.cell_items().len();
        if count > 1 {
            self.cell_item = (self.cell_item + 1) % count;
        }
    }

    fn open_menu(&mut self) {
        let target = match self.selected_item_id() {
            Some(id) => MenuTarget::Item { id },
            None => MenuTarget::Cell {
                period: self.cursor_period,
                pillar: self.cursor_pillar,
            },
        };
        self.mode = Mode::Menu {
            target,
            selected: 0,
        };
    }

    fn open_add_form(&mut self, period: usize, pillar: usize) {
        let date = index_to_date(period as f64, self.view);
        self.mode = Mode::Form {
            kind: FormKind::Add { period, pillar },
            form: ItemForm::for_new(date),
        };
        self.status = "New item (Tab/Shift-Tab move, Enter save, Esc cancel)".into();
    }

    fn open_edit_form(&mut self, id: &str, field: FormField) {
        match self.roadmap.find_item(id) {
            Some(item) => {
                let mut form = ItemForm::from_item(item);
                form.field = field;
                self.mode = Mode::Form {
                    kind: FormKind::Edit { id: id.to_string() },
                    form,
                };
                self.status = format!("Editing {}", id);
            }
            None => self.status = format!("Item {} not found", id),
        }
    }

    fn start_moving(&mut self, id: &str) {
        self.mode = Mode::Moving {
            item_id: id.to_string(),
        };
        self.status = format!("Moving {}: pick a cell, Enter to drop, Esc to cancel", id);
    }

    fn confirm_delete(&mut self, id: &str) {
        self.mode = Mode::ConfirmDelete {
            item_id: id.to_string(),
        };
        self.status = format!("Delete {}? (y to confirm, n/Esc to cancel)", id);
    }

    fn cycle_status(&mut self, id: &str) -> Result<()> {
        match self.roadmap.cycle_status(id, self.today) {
            Ok(status) => self.persist(format!("{} is now {}", id, status)),
            Err(err) => {
                self.status = format!("Status change failed: {}", err);
                Ok(())
            }
        }
    }

    fn bump_progress(&mut self, id: &str) -> Result<()> {
        let step = self.roadmap.settings.progress_step;
        match self.roadmap.bump_progress(id, step) {
            Ok(progress) => self.persist(format!("{} progress {}%", id, progress)),
            Err(err) => {
                self.status = format!("Progress change failed: {}", err);
                Ok(())
            }
        }
    }

    fn duplicate(&mut self, id: &str) -> Result<()> {
        let new_id = generate_id();
        match self.roadmap.duplicate_item(id, new_id.clone()) {
            Ok(_) => self.persist(format!("Duplicated {} as {}", id, new_id)),
            Err(err) => {
                self.status = format!("Duplicate failed: {}", err);
                Ok(())
            }
        }
    }

    fn try_submit(&mut self, kind: &FormKind, form: &ItemForm) -> Result<bool> {
        let outcome = match kind {
            FormKind::Add { pillar, .. } => self.create_item_from_form(*pillar, form),
            FormKind::Edit { id } => self.edit_item_from_form(id, form),
        };
        match outcome {
            Ok(message) => {
                self.persist(message)?;
                Ok(true)
            }
            Err(err) => {
                self.status = format!("Could not save: {:#}", err);
                Ok(false)
            }
        }
    }

    fn create_item_from_form(&mut self, pillar: usize, form: &ItemForm) -> Result<String> {
        let id = generate_id();
        let date = form.start_date()?;
        let mut item = RoadmapItem::new(id.clone(), String::new(), pillar, date, date);
        form.apply(&mut item)?;
        self.roadmap.add_item(item)?;
        self.select_item(&id);
        Ok(format!("Created item {}", id))
    }

    fn edit_item_from_form(&mut self, id: &str, form: &ItemForm) -> Result<String> {
        let mut draft = self
            .roadmap
            .find_item(id)
            .cloned()
            .ok_or_else(|| anyhow!("item {} not found", id))?;
        form.apply(&mut draft)?;
        self.roadmap.update_item(id, |item| *item = draft)?;
        Ok(format!("Updated {}", id))
    }

    fn persist(&mut self, message: impl Into<String>) -> Result<()> {
        save_board(&self.location, &self.roadmap)?;
        self.last_save = Instant::now();
        self.status = message.into();
        Ok(())
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let colors = palette(self.roadmap.settings.dark);
        f.render_widget(
            Block::default().style(Style::default().bg(colors.background)),
            f.size(),
        );
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0], &colors);
        self.draw_grid(f, layout[1], &colors);
        self.draw_footer(f, layout[2], &colors);

        match &self.mode {
            Mode::Menu { target, selected } => self.draw_menu(f, target, *selected, &colors),
            Mode::Form { kind, form } => {
                let title = match kind {
                    FormKind::Add { period, .. } => {
                        format!("Add New Item · {}", period_label(*period, self.view))
                    }
                    FormKind::Edit { id } => format!("Edit Item {}", id),
                };
                draw_form(f, &title, form, &colors);
            }
            Mode::ConfirmDelete { item_id } => self.draw_confirm(f, item_id),
            Mode::Moving { .. } | Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect, colors: &Palette) {
        let mut spans = vec![
            Span::styled(
                "roadmap ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.roadmap.name.clone(),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.location.scope.label(), Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(colors.muted),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("today {}", self.today.format("%Y-%m-%d")),
                Style::default().fg(colors.muted),
            ),
        ];
        if let Some(project) = self.project.as_deref() {
            let name = self
                .roadmap
                .find_project(project)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| project.to_string());
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(name, Style::default().fg(Color::LightYellow)));
        }
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(colors.grid));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_grid(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, colors: &Palette) {
        if self.roadmap.pillars.is_empty() {
            let msg = Paragraph::new("No pillars defined")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("roadmap"));
            f.render_widget(Clear, area);
            f.render_widget(msg, area);
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(0)])
            .split(area);
        let label_area = columns[0];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(columns[1]);
        let (header_area, body) = (rows[0], rows[1]);

        let periods = self.view.visible_periods();
        let rows_per_period = (body.height / periods.max(1) as u16).max(MIN_ROWS_PER_PERIOD);
        let shown = (body.height / rows_per_period).max(1) as usize;
        self.period_offset =
            adjust_offset(self.cursor_period, self.period_offset, shown, 1, periods);

        let metrics = LayoutMetrics {
            period_size: rows_per_period as f64,
            gap: 0.0,
        };
        let board = match self.layout(metrics) {
            Ok(board) => board,
            Err(err) => {
                self.status = format!("Layout failed: {:#}", err);
                return;
            }
        };

        let pillar_count = self.roadmap.pillars.len() as u32;
        let pillar_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                (0..pillar_count)
                    .map(|_| Constraint::Ratio(1, pillar_count))
                    .collect::<Vec<_>>(),
            )
            .split(header_area);
        let column_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                (0..pillar_count)
                    .map(|_| Constraint::Ratio(1, pillar_count))
                    .collect::<Vec<_>>(),
            )
            .split(body);

        let label_body = Rect {
            y: body.y,
            height: body.height,
            ..label_area
        };
        for row in 0..shown.min(periods - self.period_offset) {
            let period = self.period_offset + row;
            let y = body.y + row as u16 * rows_per_period;
            let label_rect = Rect {
                y,
                height: 1,
                ..label_body
            };
            let style = if period == self.cursor_period {
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted)
            };
            let label = board.labels.get(period).cloned().unwrap_or_default();
            f.render_widget(
                Paragraph::new(Span::styled(label, style)).alignment(Alignment::Right),
                Rect {
                    width: label_rect.width.saturating_sub(1),
                    ..label_rect
                },
            );
            let rule = Rect {
                x: body.x,
                y,
                width: body.width,
                height: 1,
            };
            f.render_widget(
                Paragraph::new("╌".repeat(body.width as usize))
                    .style(Style::default().fg(colors.grid)),
                rule,
            );
        }

        for (idx, column) in board.columns.iter().enumerate() {
            let pillar = &self.roadmap.pillars[idx];
            let accent = pillar_color(pillar.color);
            let header = Paragraph::new(vec![
                Line::from(Span::styled(
                    pillar.title.to_uppercase(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_text(&pillar.description, header_area.width as usize),
                    Style::default().fg(colors.text),
                )),
            ])
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(if idx == self.cursor_pillar {
                        accent
                    } else {
                        colors.grid
                    })),
            );
            f.render_widget(header, pillar_areas[idx]);
            self.draw_column(f, column, column_areas[idx], body, rows_per_period, colors);
        }
    }

    fn draw_column(
        &self,
        f: &mut ratatui::Frame<'_>,
        column: &ColumnLayout,
        area: Rect,
        body: Rect,
        rows_per_period: u16,
        colors: &Palette,
    ) {
        let scroll = self.period_offset as f64 * rows_per_period as f64;
        let selected = self.selected_item_id();
        let moving = match &self.mode {
            Mode::Moving { item_id } => Some(item_id.as_str()),
            _ => None,
        };

        if column.pillar == self.cursor_pillar
            && self.cursor_period >= self.period_offset
        {
            let y = body.y + ((self.cursor_period - self.period_offset) as u16 * rows_per_period);
            let cell = Rect {
                x: area.x,
                y,
                width: area.width,
                height: rows_per_period,
            }
            .intersection(body);
            if cell.height > 0 {
                let border = if moving.is_some() {
                    Color::LightGreen
                } else {
                    Color::LightYellow
                };
                f.render_widget(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border)),
                    cell,
                );
            }
        }

        for positioned in &column.items {
            let Some(rect) = card_rect(area, body, positioned, scroll) else {
                continue;
            };
            let is_selected = selected.as_deref() == Some(positioned.item.id.as_str());
            let is_moving = moving == Some(positioned.item.id.as_str());
            let card = self.item_card(positioned, rect, is_selected, is_moving, colors);
            f.render_widget(Clear, rect);
            f.render_widget(card, rect);
        }
    }

    fn item_card(
        &self,
        positioned: &PositionedItem,
        rect: Rect,
        selected: bool,
        moving: bool,
        colors: &Palette,
    ) -> Paragraph<'static> {
        let item = &positioned.item;
        let status = item_effective_status(item, self.today);
        let accent = status_color(status);
        let inner = rect.width.saturating_sub(2) as usize;
        let mut lines = vec![Line::from(Span::styled(
            truncate_text(&item.title, inner),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ))];
        let mut meta = vec![Span::styled(
            status.label().to_string(),
            Style::default().fg(accent),
        )];
        if item.progress > 0 {
            meta.push(Span::raw(" "));
            meta.push(Span::styled(
                progress_bar(item.progress, 6),
                Style::default().fg(pillar_color(
                    self.roadmap
                        .pillars
                        .get(item.pillar)
                        .map(|p| p.color)
                        .unwrap_or(PillarColor::Azure),
                )),
            ));
        }
        lines.push(Line::from(meta));
        if let Some(tag) = &item.tag {
            lines.push(Line::from(Span::styled(
                truncate_text(&format!("#{}", tag), inner),
                Style::default().fg(Color::LightRed),
            )));
        }
        if !item.assignees.is_empty() {
            let names: Vec<&str> = item
                .assignees
                .iter()
                .map(|id| self.roadmap.user_name(id))
                .collect();
            lines.push(Line::from(Span::styled(
                truncate_text(&format!("@{}", names.join(" @")), inner),
                Style::default().fg(colors.muted),
            )));
        }

        let mut border = Style::default().fg(accent);
        let mut body = Style::default().bg(colors.surface).fg(colors.text);
        if selected {
            border = border.add_modifier(Modifier::BOLD);
            body = body.add_modifier(Modifier::BOLD);
        }
        if moving {
            body = body.add_modifier(Modifier::REVERSED);
        }
        Paragraph::new(lines).style(body).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(if selected { "▶" } else { "" }),
        )
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect, colors: &Palette) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(colors.grid)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .style(Style::default().fg(colors.text))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(colors.grid)),
            );
        f.render_widget(status, bottom[0]);

        let detail = match self.selected_item() {
            Some(item) => selected_item_detail(item),
            None => Line::from("No item selected"),
        };
        let detail = Paragraph::new(detail).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors.grid))
                .title("Selected"),
        );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        let mut spans = vec![
            key("1/2/3", Color::LightCyan),
            Span::raw(" week/month/quarter  "),
        ];
        match self.mode {
            Mode::Moving { .. } => spans.extend([
                key("←↑↓→", Color::LightCyan),
                Span::raw(" pick cell  "),
                key("Enter", Color::LightGreen),
                Span::raw(" drop  "),
                key("Esc", Color::LightRed),
                Span::raw(" cancel"),
            ]),
            _ => spans.extend([
                key("←↑↓→ / h j k l", Color::LightCyan),
                Span::raw(" move  "),
                key("Tab", Color::LightCyan),
                Span::raw(" next item  "),
                key("Enter", Color::LightYellow),
                Span::raw(" menu  "),
                key("n", Color::LightMagenta),
                Span::raw(" new  "),
                key("e", Color::LightYellow),
                Span::raw(" edit  "),
                key("s", Color::LightGreen),
                Span::raw(" status  "),
                key("p", Color::LightGreen),
                Span::raw(" progress  "),
                key("m", Color::LightGreen),
                Span::raw(" move  "),
                key("c", Color::LightMagenta),
                Span::raw(" copy  "),
                key("d", Color::LightRed),
                Span::raw(" delete  "),
                key("f", Color::LightCyan),
                Span::raw(" project  "),
                key("t", Color::LightCyan),
                Span::raw(" theme  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
        }
        Line::from(spans)
    }

    fn draw_menu(
        &self,
        f: &mut ratatui::Frame<'_>,
        target: &MenuTarget,
        selected: usize,
        colors: &Palette,
    ) {
        let actions = target.actions();
        let area = centered_rect(30, 40, f.size());
        let items = actions
            .iter()
            .map(|action| {
                let color = if action.is_destructive() {
                    Color::LightRed
                } else {
                    colors.text
                };
                ListItem::new(action.label()).style(Style::default().fg(color))
            })
            .collect::<Vec<_>>();
        let title = match target {
            MenuTarget::Cell { period, pillar } => format!(
                "{} · {}",
                self.roadmap
                    .pillars
                    .get(*pillar)
                    .map(|p| p.title.as_str())
                    .unwrap_or("?"),
                period_label(*period, self.view)
            ),
            MenuTarget::Item { id } => self
                .roadmap
                .find_item(id)
                .map(|item| item.title.clone())
                .unwrap_or_else(|| id.clone()),
        };
        let mut state = ListState::default();
        state.select(Some(selected));
        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(
                        truncate_text(&title, area.width.saturating_sub(4) as usize),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .style(Style::default().bg(colors.surface)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::LightCyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, item_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .roadmap
            .find_item(item_id)
            .map(|i| i.title.clone())
            .unwrap_or_else(|| item_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl ItemForm {
    fn for_new(date: NaiveDate) -> Self {
        let day = format_date(date);
        ItemForm {
            title: FieldValue::new(""),
            description: FieldValue::new(""),
            tag: FieldValue::new(""),
            assignees: FieldValue::new(""),
            progress: FieldValue::new("0"),
            status: FieldValue::new(Status::Todo.label()),
            start: FieldValue::new(&day),
            end: FieldValue::new(&day),
            field: FormField::Title,
        }
    }

    fn from_item(item: &RoadmapItem) -> Self {
        ItemForm {
            title: FieldValue::new(&item.title),
            description: FieldValue::new(item.description.as_deref().unwrap_or_default()),
            tag: FieldValue::new(item.tag.as_deref().unwrap_or_default()),
            assignees: FieldValue::new(&item.assignees.join(" ")),
            progress: FieldValue::new(&item.progress.to_string()),
            status: FieldValue::new(item.status.label()),
            start: FieldValue::new(&format_date(item.start_date)),
            end: FieldValue::new(&format_date(item.end_date)),
            field: FormField::Title,
        }
    }

    fn start_date(&self) -> Result<NaiveDate> {
        parse_date(&self.start.value)
    }

    /// Copy the form onto `item`. Range checks are left to the roadmap.
    fn apply(&self, item: &mut RoadmapItem) -> Result<()> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Err(anyhow!("title is required"));
        }
        let progress = self
            .progress
            .value
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow!("progress must be a number from 0 to 100"))?;
        let status = self.status.value.parse::<Status>()?;
        let start = parse_date(&self.start.value)?;
        let end = parse_date(&self.end.value)?;

        item.title = title.to_string();
        item.description = self.description.optional();
        item.tag = self.tag.optional();
        item.assignees = parse_list(&self.assignees.value);
        item.progress = progress;
        item.status = status;
        item.start_date = start;
        item.end_date = end;
        Ok(())
    }

    fn field_value(&self, field: FormField) -> &FieldValue {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Tag => &self.tag,
            FormField::Assignees => &self.assignees,
            FormField::Progress => &self.progress,
            FormField::Status => &self.status,
            FormField::Start => &self.start,
            FormField::End => &self.end,
        }
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Tag => &mut self.tag,
            FormField::Assignees => &mut self.assignees,
            FormField::Progress => &mut self.progress,
            FormField::Status => &mut self.status,
            FormField::Start => &mut self.start,
            FormField::End => &mut self.end,
        }
    }

    fn next_field(&mut self) {
        let pos = FORM_FIELDS.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = FORM_FIELDS[(pos + 1) % FORM_FIELDS.len()];
    }

    fn prev_field(&mut self) {
        let pos = FORM_FIELDS.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = FORM_FIELDS[(pos + FORM_FIELDS.len() - 1) % FORM_FIELDS.len()];
    }
}

fn draw_form(f: &mut ratatui::Frame<'_>, title: &str, form: &ItemForm, colors: &Palette) {
    let area = centered_rect(70, 60, f.size());
    let mut lines = FORM_FIELDS
        .iter()
        .map(|field| field_line(field.label(), form.field_value(*field), form.field == *field))
        .collect::<Vec<_>>();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter to save • Esc to cancel • Tab/Shift-Tab to move • status: todo, in progress, done, delayed",
        Style::default().fg(colors.muted),
    )));
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .style(Style::default().bg(colors.surface)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Terminal cell rectangle for a packed item inside `column`, scrolled up by
/// `scroll` rows and clipped to `body`. `None` when nothing is visible.
fn card_rect(column: Rect, body: Rect, positioned: &PositionedItem, scroll: f64) -> Option<Rect> {
    let width = column.width as f64;
    let left = column.x as f64 + (positioned.lane_left * width).round();
    let right = column.x as f64 + ((positioned.lane_left + positioned.lane_width) * width).round();
    let top = body.y as f64 + (positioned.lane_top - scroll).floor();
    let bottom = top + positioned.lane_height.round();

    let clip_top = top.max(body.y as f64);
    let clip_bottom = bottom.min((body.y + body.height) as f64);
    if right <= left || clip_bottom <= clip_top {
        return None;
    }
    let rect = Rect {
        x: left as u16,
        y: clip_top as u16,
        width: (right - left) as u16,
        height: (clip_bottom - clip_top) as u16,
    };
    let clipped = rect.intersection(column);
    if clipped.width == 0 || clipped.height == 0 {
        None
    } else {
        Some(clipped)
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date (use YYYY-MM-DD): {}", trimmed))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_list(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .collect()
}

fn pillar_color(color: PillarColor) -> Color {
    match color {
        PillarColor::Salmon => Color::Rgb(248, 113, 113),
        PillarColor::Gold => Color::Rgb(251, 191, 36),
        PillarColor::Emerald => Color::Rgb(52, 211, 153),
        PillarColor::Azure => Color::Rgb(96, 165, 250),
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::Rgb(100, 116, 139),
        Status::InProgress => Color::Rgb(52, 211, 153),
        Status::Done => Color::Rgb(148, 163, 184),
        Status::Delayed => Color::Rgb(59, 130, 246),
    }
}

fn progress_bar(progress: u8, width: usize) -> String {
    let filled = (progress.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn selected_item_detail(item: &RoadmapItem) -> Line<'static> {
    let mut spans = vec![Span::styled(
        item.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("{} → {}", format_date(item.start_date), format_date(item.end_date)),
        Style::default().fg(Color::LightRed),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("{} · {}%", item.status, item.progress),
        Style::default().fg(Color::LightGreen),
    ));
    if let Some(description) = &item.description {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            description.clone(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(lane: usize, lanes: usize, start: f64, end: f64, rows: f64) -> PositionedItem {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        PositionedItem {
            item: RoadmapItem::new("a".into(), "A".into(), 0, date, date),
            start_index: start,
            end_index: end,
            lane,
            lane_top: start * rows,
            lane_height: (end - start + 1.0) * rows,
            lane_left: lane as f64 / lanes as f64,
            lane_width: 1.0 / lanes as f64,
        }
    }

    #[test]
    fn menu_offers_add_on_cells_and_edits_on_items() {
        let cell = MenuTarget::Cell {
            period: 2,
            pillar: 1,
        };
        assert_eq!(cell.actions(), &[MenuAction::AddItem]);
        let item = MenuTarget::Item { id: "x".into() };
        let labels: Vec<&str> = item.actions().iter().map(|a| a.label()).collect();
        assert_eq!(labels.first(), Some(&"Update Details"));
        assert_eq!(labels.last(), Some(&"Delete Item"));
        assert!(item.actions().iter().filter(|a| a.is_destructive()).count() == 1);
    }

    #[test]
    fn cards_split_the_column_by_lane() {
        let column = Rect::new(10, 5, 40, 30);
        let left = card_rect(column, column, &positioned(0, 2, 1.0, 2.0, 3.0), 0.0).unwrap();
        let right = card_rect(column, column, &positioned(1, 2, 1.0, 2.0, 3.0), 0.0).unwrap();
        assert_eq!(left, Rect::new(10, 8, 20, 6));
        assert_eq!(right, Rect::new(30, 8, 20, 6));
    }

    #[test]
    fn cards_are_clipped_when_scrolled() {
        let column = Rect::new(0, 0, 20, 10);
        let partly = card_rect(column, column, &positioned(0, 1, 0.0, 1.0, 3.0), 3.0).unwrap();
        assert_eq!(partly, Rect::new(0, 0, 20, 3));
        assert_eq!(
            card_rect(column, column, &positioned(0, 1, 0.0, 0.0, 3.0), 6.0),
            None
        );
    }

    #[test]
    fn form_applies_parsed_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut form = ItemForm::for_new(date);
        form.title = FieldValue::new("Load testing");
        form.assignees = FieldValue::new("user1, user2");
        form.progress = FieldValue::new("40");
        form.status = FieldValue::new("in progress");
        form.end = FieldValue::new("2026-03-16");
        let mut item = RoadmapItem::new("i".into(), String::new(), 2, date, date);
        form.apply(&mut item).unwrap();
        assert_eq!(item.title, "Load testing");
        assert_eq!(item.assignees, vec!["user1", "user2"]);
        assert_eq!(item.progress, 40);
        assert_eq!(item.status, Status::InProgress);
        assert_eq!(item.start_date, date);
        assert_eq!(item.end_date, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
        assert_eq!(item.tag, None);
    }

    #[test]
    fn form_rejects_bad_input() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut item = RoadmapItem::new("i".into(), "x".into(), 0, date, date);
        let form = ItemForm::for_new(date);
        assert!(form.apply(&mut item).is_err());

        let mut form = ItemForm::from_item(&item);
        form.start = FieldValue::new("03/02/2026");
        assert!(form.apply(&mut item).is_err());
        assert_eq!(item.title, "x");
    }

    #[test]
    fn form_fields_cycle_both_ways() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut form = ItemForm::for_new(date);
        form.prev_field();
        assert_eq!(form.field, FormField::End);
        form.next_field();
        form.next_field();
        assert_eq!(form.field, FormField::Description);
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_text("Performance testing", 10), "Perform...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abc", 0), "");
    }
}
