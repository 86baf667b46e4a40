mod cli;
mod commands;
mod ui;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use commands::RunContext;

fn main() -> Result<()> {
    if let Err(err) = roadmap::logging::init_logging() {
        eprintln!("warning: failed to initialize logging: {err:#}");
    }
    let args = cli::Cli::parse();
    let ctx = RunContext {
        view: args.view,
        today: args.today.unwrap_or_else(|| Local::now().date_naive()),
    };
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init { name } => commands::init(name),
        cli::Command::List { project, pillar } => commands::list(&ctx, project, pillar),
        cli::Command::Add {
            title,
            pillar,
            at,
            tag,
            desc,
            assignees,
            project,
        } => commands::add(&ctx, title, pillar, at, tag, desc, assignees, project),
        cli::Command::Move {
            item_id,
            to,
            pillar,
        } => commands::move_item(&ctx, item_id, to, pillar),
        cli::Command::Edit {
            item_id,
            title,
            desc,
            tag,
            clear_tag,
            progress,
            status,
            start,
            end,
            assignees,
            clear_assignees,
            project,
        } => commands::edit(
            &ctx,
            item_id,
            title,
            desc,
            tag,
            clear_tag,
            progress,
            status,
            start,
            end,
            assignees,
            clear_assignees,
            project,
        ),
        cli::Command::Status { item_id } => commands::cycle_status(&ctx, item_id),
        cli::Command::Bump { item_id } => commands::bump(&ctx, item_id),
        cli::Command::Duplicate { item_id } => commands::duplicate(&ctx, item_id),
        cli::Command::Delete { item_id } => commands::delete(&ctx, item_id),
        cli::Command::Tui => commands::tui(&ctx),
    }
}
