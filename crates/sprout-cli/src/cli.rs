use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sprout")]
#[command(about = "Track plants and their watering schedules")]
pub struct Cli {
    /// Config file (defaults to $SPROUT_CONFIG, then ~/.sprout/sprout.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a plant and its watering schedule from a photo classification
    Adopt(AdoptArgs),
    /// Add a plant without a schedule
    AddPlant(AddPlantArgs),
    /// Attach a watering schedule to a plant that has none
    Schedule {
        #[arg(long)]
        user: String,
        #[arg(long)]
        plant_id: i64,
        /// Repeat every N units
        #[arg(long)]
        every: u32,
        /// day(s), week(s) or month(s)
        #[arg(long)]
        unit: String,
    },
    /// Whether the user is still under the plant quota (advisory)
    CanAdd {
        #[arg(long)]
        user: String,
    },
    /// List the user's plants
    Plants {
        #[arg(long)]
        user: String,
    },
    /// List schedules watered today or due/overdue
    Due {
        #[arg(long)]
        user: String,
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change a plant's pet name
    Rename {
        #[arg(long)]
        user: String,
        #[arg(long)]
        plant_id: i64,
        #[arg(long)]
        name: String,
    },
    /// Replace a plant's photo
    Photo {
        #[arg(long)]
        user: String,
        #[arg(long)]
        plant_id: i64,
        #[arg(long)]
        image_url: String,
    },
    /// Toggle a schedule between pending and done
    Complete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        schedule_id: i64,
    },
    /// Remove a plant and its schedule
    Delete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        plant_id: i64,
    },
    /// Reopen completed schedules that are due again
    Rollover {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
pub struct AdoptArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub image_url: String,
    #[arg(long)]
    pub pet_name: String,
    /// File holding the vision service's reply; the fallback record is used
    /// when the flag is absent or the file is unreadable or unparseable
    #[arg(long)]
    pub reply: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AddPlantArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub plant_name: String,
    #[arg(long)]
    pub scientific_name: String,
    #[arg(long)]
    pub species: String,
    #[arg(long)]
    pub image_url: String,
    #[arg(long)]
    pub pet_name: String,
    /// 0-100
    #[arg(long, default_value_t = 100)]
    pub health: u8,
}
