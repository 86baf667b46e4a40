use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rand::{distributions::Alphanumeric, Rng};
use roadmap::board::{layout_board, ColumnLayout};
use roadmap::calendar::{period_label, ViewMode};
use roadmap::layout::PositionedItem;
use roadmap::model::{Roadmap, RoadmapItem};
use roadmap::reposition::MoveRequest;
use roadmap::status::{item_effective_status, Status};
use roadmap::storage::{init_project_board, load_board, locate_board, save_board, BoardLocation};
use std::env;
use tracing::info;

/// Flags shared by every command.
pub struct RunContext {
    pub view: Option<ViewMode>,
    pub today: NaiveDate,
}

impl RunContext {
    fn view_for(&self, roadmap: &Roadmap) -> ViewMode {
        self.view.unwrap_or(roadmap.settings.view)
    }
}

pub fn init(name: Option<String>) -> Result<()> {
    let location = init_project_board(name)?;
    println!("Initialized roadmap at {}", location.path.display());
    Ok(())
}

pub fn list(ctx: &RunContext, project: Option<String>, pillar: Option<u32>) -> Result<()> {
    let (roadmap, location) = load_current_board(ctx.today)?;
    let view = ctx.view_for(&roadmap);
    if let Some(p) = project.as_deref() {
        if roadmap.find_project(p).is_none() {
            return Err(anyhow!("project not found: {}", p));
        }
    }
    let only = pillar.map(|id| roadmap.pillar_index(id)).transpose()?;
    let layout = layout_board(
        &roadmap,
        view,
        roadmap.settings.metrics(),
        project.as_deref(),
    )
    .context("laying out roadmap")?;

    println!(
        "Roadmap: {} ({})  view {}  today {}",
        roadmap.name,
        location.scope.label(),
        view,
        ctx.today.format("%Y-%m-%d")
    );
    for column in &layout.columns {
        if only.is_some_and(|idx| idx != column.pillar) {
            continue;
        }
        print_column(&roadmap, column, view, ctx.today);
        println!();
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    ctx: &RunContext,
    title: String,
    pillar: u32,
    at: f64,
    tag: Option<String>,
    desc: Option<String>,
    assignees: Vec<String>,
    project: Option<String>,
) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let view = ctx.view_for(&roadmap);
    let pillar_idx = roadmap.pillar_index(pillar)?;
    let id = generate_id();
    let mut item = RoadmapItem::at_period(id.clone(), title, pillar_idx, at, view);
    item.tag = tag;
    item.description = desc;
    item.assignees = assignees;
    item.project = project;
    let start = item.start_date;
    roadmap
        .add_item(item)
        .with_context(|| format!("adding item to pillar {}", pillar))?;
    save_board(&location, &roadmap)?;
    info!(item = %id, pillar, %view, "added item");
    println!("Added item {} to pillar {} starting {}", id, pillar, start);
    Ok(())
}

pub fn move_item(ctx: &RunContext, item_id: String, to: f64, pillar: Option<u32>) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let view = ctx.view_for(&roadmap);
    let current = roadmap
        .find_item(&item_id)
        .map(|item| item.pillar)
        .ok_or_else(|| anyhow!("item {} not found", item_id))?;
    let target_pillar = match pillar {
        Some(id) => roadmap.pillar_index(id)?,
        None => current,
    };
    let request = MoveRequest {
        item_id: item_id.clone(),
        target_pillar,
        target_index: to,
    };
    let moved = roadmap
        .apply_move(&request, view)
        .with_context(|| format!("moving item {}", item_id))?;
    let (start, end) = (moved.start_date, moved.end_date);
    save_board(&location, &roadmap)?;
    info!(item = %item_id, to, target_pillar, %view, "moved item");
    println!("Moved {} to {} → {}", item_id, start, end);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    ctx: &RunContext,
    item_id: String,
    title: Option<String>,
    desc: Option<String>,
    tag: Option<String>,
    clear_tag: bool,
    progress: Option<u8>,
    status: Option<Status>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    assignees: Vec<String>,
    clear_assignees: bool,
    project: Option<String>,
) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    roadmap
        .update_item(&item_id, |item| {
            if let Some(t) = title {
                item.title = t;
            }
            if let Some(d) = desc {
                item.description = Some(d);
            }
            if clear_tag {
                item.tag = None;
            }
            if let Some(t) = tag {
                item.tag = Some(t);
            }
            if let Some(p) = progress {
                item.progress = p;
            }
            if let Some(s) = status {
                item.status = s;
            }
            if let Some(s) = start {
                item.start_date = s;
            }
            if let Some(e) = end {
                item.end_date = e;
            }
            if clear_assignees {
                item.assignees.clear();
            }
            if !assignees.is_empty() {
                item.assignees = assignees;
            }
            if let Some(p) = project {
                item.project = Some(p);
            }
        })
        .with_context(|| format!("updating item {}", item_id))?;
    save_board(&location, &roadmap)?;
    info!(item = %item_id, "edited item");
    println!("Updated item {}", item_id);
    Ok(())
}

pub fn cycle_status(ctx: &RunContext, item_id: String) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let status = roadmap
        .cycle_status(&item_id, ctx.today)
        .with_context(|| format!("changing status of {}", item_id))?;
    save_board(&location, &roadmap)?;
    info!(item = %item_id, %status, "cycled status");
    println!("{} is now {}", item_id, status);
    Ok(())
}

pub fn bump(ctx: &RunContext, item_id: String) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let step = roadmap.settings.progress_step;
    let progress = roadmap
        .bump_progress(&item_id, step)
        .with_context(|| format!("bumping progress of {}", item_id))?;
    save_board(&location, &roadmap)?;
    println!("{} progress {}%", item_id, progress);
    Ok(())
}

pub fn duplicate(ctx: &RunContext, item_id: String) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let new_id = generate_id();
    roadmap
        .duplicate_item(&item_id, new_id.clone())
        .with_context(|| format!("duplicating {}", item_id))?;
    save_board(&location, &roadmap)?;
    info!(item = %item_id, copy = %new_id, "duplicated item");
    println!("Duplicated {} as {}", item_id, new_id);
    Ok(())
}

pub fn delete(ctx: &RunContext, item_id: String) -> Result<()> {
    let (mut roadmap, location) = load_current_board(ctx.today)?;
    let removed = roadmap
        .remove_item(&item_id)
        .with_context(|| format!("deleting {}", item_id))?;
    save_board(&location, &roadmap)?;
    info!(item = %item_id, "deleted item");
    println!("Deleted {} ({})", removed.id, removed.title);
    Ok(())
}

pub fn tui(ctx: &RunContext) -> Result<()> {
    let (roadmap, location) = load_current_board(ctx.today)?;
    let view = ctx.view_for(&roadmap);
    ui::run(roadmap, location, view, ctx.today)
}

/// Load the board for the current directory and run the one-time overdue
/// sweep. The board is saved right away when the sweep changed anything.
fn load_current_board(today: NaiveDate) -> Result<(Roadmap, BoardLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_board(&cwd)?;
    let mut roadmap = load_board(&location)?;
    let delayed = roadmap.sweep_overdue(today);
    if !delayed.is_empty() {
        info!(count = delayed.len(), ids = ?delayed, "marked overdue items as delayed");
        save_board(&location, &roadmap)?;
    }
    Ok((roadmap, location))
}

pub(crate) fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

fn print_column(roadmap: &Roadmap, column: &ColumnLayout, view: ViewMode, today: NaiveDate) {
    let pillar = &roadmap.pillars[column.pillar];
    println!(
        "[{}] {} ({} lane{})",
        pillar.id,
        pillar.title,
        column.lane_count,
        if column.lane_count == 1 { "" } else { "s" }
    );
    if column.items.is_empty() {
        println!("  (empty)");
    }
    for positioned in &column.items {
        print_item(roadmap, positioned, column.lane_count, view, today);
    }
    if !column.hidden.is_empty() {
        println!("  hidden past the window: {}", column.hidden.join(", "));
    }
}

fn print_item(
    roadmap: &Roadmap,
    positioned: &PositionedItem,
    lane_count: usize,
    view: ViewMode,
    today: NaiveDate,
) {
    let item = &positioned.item;
    let first = period_label(positioned.start_index.floor() as usize, view);
    let last = period_label(positioned.end_index.floor() as usize, view);
    println!(
        "  lane {}/{}  {} → {}  [{}] {}",
        positioned.lane + 1,
        lane_count,
        first,
        last,
        item.id,
        item.title
    );
    let mut details = vec![
        item_effective_status(item, today).to_string(),
        format!("{}%", item.progress),
        format!("{} → {}", item.start_date, item.end_date),
    ];
    if let Some(tag) = &item.tag {
        details.push(format!("#{}", tag));
    }
    if !item.assignees.is_empty() {
        let names: Vec<&str> = item
            .assignees
            .iter()
            .map(|id| roadmap.user_name(id))
            .collect();
        details.push(format!("@{}", names.join(" @")));
    }
    println!("      {}", details.join("  "));
    println!(
        "      top {:.1}  height {:.1}  left {:.2}  width {:.2}",
        positioned.lane_top, positioned.lane_height, positioned.lane_left, positioned.lane_width
    );
    if let Some(desc) = &item.description {
        println!("      {}", desc);
    }
}
