use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roadmap::calendar::ViewMode;
use roadmap::status::Status;

#[derive(Parser, Debug)]
#[command(
    name = "roadmap",
    version,
    about = "Terminal roadmap board with week, month and quarter views"
)]
pub struct Cli {
    /// View mode: week, month or quarter (defaults to the board setting)
    #[arg(long, global = true)]
    pub view: Option<ViewMode>,
    /// Treat this date (YYYY-MM-DD) as today when resolving overdue items
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a roadmap in the current directory
    Init {
        /// Optional roadmap name
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the lane layout of every pillar
    List {
        /// Only items of this project id
        #[arg(long)]
        project: Option<String>,
        /// Only this pillar id
        #[arg(long)]
        pillar: Option<u32>,
    },
    /// Add a new item at a period of the active view
    Add {
        /// Title of the item
        title: String,
        /// Pillar id to place the item in
        #[arg(long)]
        pillar: u32,
        /// Period index to start at (defaults to 0)
        #[arg(long, default_value_t = 0.0)]
        at: f64,
        /// Short tag shown on the card
        #[arg(long)]
        tag: Option<String>,
        /// Optional description
        #[arg(long)]
        desc: Option<String>,
        /// Assignee user id (repeatable)
        #[arg(long = "assignee", short = 'a')]
        assignees: Vec<String>,
        /// Owning project id
        #[arg(long)]
        project: Option<String>,
    },
    /// Move an item to another period, keeping its duration
    Move {
        /// Item id to move
        item_id: String,
        /// Target period index in the active view
        #[arg(long)]
        to: f64,
        /// Target pillar id (defaults to the current pillar)
        #[arg(long)]
        pillar: Option<u32>,
    },
    /// Edit an existing item
    Edit {
        /// Item id to edit
        item_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        desc: Option<String>,
        /// New tag
        #[arg(long)]
        tag: Option<String>,
        /// Remove the tag
        #[arg(long)]
        clear_tag: bool,
        /// Progress percentage (0-100)
        #[arg(long)]
        progress: Option<u8>,
        /// Stored status: todo, in-progress, done or delayed
        #[arg(long)]
        status: Option<Status>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Replace assignees (repeatable)
        #[arg(long = "assignee", short = 'a')]
        assignees: Vec<String>,
        /// Remove all assignees
        #[arg(long)]
        clear_assignees: bool,
        /// Owning project id
        #[arg(long)]
        project: Option<String>,
    },
    /// Advance an item's status from what is currently displayed
    Status {
        /// Item id
        item_id: String,
    },
    /// Bump an item's progress by the configured step
    Bump {
        /// Item id
        item_id: String,
    },
    /// Copy an item under a new id
    Duplicate {
        /// Item id
        item_id: String,
    },
    /// Delete an item
    Delete {
        /// Item id
        item_id: String,
    },
    /// Launch the interactive TUI
    Tui,
}
