use std::path::Path;

use clap::Parser;
use serde_json::{json, Value};
use sprout_core::classify::{classify_or_fallback, Classifier, FallbackClassifier, ReplyClassifier};
use sprout_core::SproutConfig;
use sprout_garden::{GardenError, GardenManager, Interval, NewPlant};
use tracing::{info, warn};

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprout=info,sprout_garden=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // config: --config > SPROUT_CONFIG env > ~/.sprout/sprout.toml
    let config_path = cli.config.clone().or_else(|| std::env::var("SPROUT_CONFIG").ok());
    let config = SproutConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SproutConfig::default()
    });

    let garden = GardenManager::open(&config)?;
    info!(quota = garden.quota(), "garden ready");

    match run(cli.command, &garden) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            let body = json!({ "error": e.code(), "message": e.to_string() });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

/// Errors are garden rejections, reported to the caller as outcome codes.
fn run(command: Commands, garden: &GardenManager) -> Result<Value, GardenError> {
    match command {
        Commands::Adopt(args) => {
            let classifier = classifier_for(args.reply.as_deref());
            let classification = classify_or_fallback(classifier.as_ref(), &args.image_url);
            let plant =
                NewPlant::from_classification(&classification, &args.image_url, &args.pet_name);
            let interval = Interval::from_classification(&classification);
            garden
                .adopt_plant(&args.user, &plant, interval)
                .map(|a| json!({ "adopted": a, "classification": classification }))
        }
        Commands::AddPlant(args) => {
            let plant = NewPlant {
                plant_name: args.plant_name,
                scientific_name: args.scientific_name,
                species: args.species,
                image_url: args.image_url,
                plant_pet_name: args.pet_name,
                plant_health: args.health,
            };
            garden
                .add_plant(&args.user, &plant)
                .map(|plant_id| json!({ "plant_id": plant_id }))
        }
        Commands::Schedule {
            user,
            plant_id,
            every,
            unit,
        } => Interval::parse(every, &unit)
            .and_then(|interval| garden.create_schedule(&user, plant_id, interval))
            .map(|schedule_id| json!({ "schedule_id": schedule_id })),
        Commands::CanAdd { user } => garden
            .can_add_plant(&user)
            .map(|can| json!({ "can_add_plant": can, "quota": garden.quota() })),
        Commands::Plants { user } => garden
            .fetch_plants(&user)
            .map(|plants| json!({ "plants": plants })),
        Commands::Due { user, date } => match date {
            Some(d) => garden.fetch_schedule_on(&user, d),
            None => garden.fetch_schedule(&user),
        }
        .map(|schedule| json!({ "schedule": schedule })),
        Commands::Rename {
            user,
            plant_id,
            name,
        } => garden
            .rename_plant(&user, plant_id, &name)
            .map(|name| json!({ "plant_id": plant_id, "plant_pet_name": name })),
        Commands::Photo {
            user,
            plant_id,
            image_url,
        } => garden
            .update_plant_photo(&user, plant_id, &image_url)
            .map(|()| json!({ "plant_id": plant_id, "image_url": image_url })),
        Commands::Complete { user, schedule_id } => garden
            .complete_schedule(&user, schedule_id)
            .map(|state| json!({ "schedule_id": schedule_id, "state": state })),
        Commands::Delete { user, plant_id } => garden
            .delete_plant(&user, plant_id)
            .map(|()| json!({ "deleted": plant_id })),
        Commands::Rollover { date } => match date {
            Some(d) => garden.roll_over_on(d),
            None => garden.roll_over(),
        }
        .map(|reopened| json!({ "reopened": reopened })),
    }
}

/// Pick the classifier for `adopt`. A reply file that cannot be read is
/// treated like a failed classification.
fn classifier_for(reply: Option<&Path>) -> Box<dyn Classifier> {
    match reply.map(ReplyClassifier::from_file) {
        Some(Ok(classifier)) => Box::new(classifier),
        Some(Err(e)) => {
            warn!(code = e.code(), error = %e, "reply file unreadable, using fallback");
            Box::new(FallbackClassifier)
        }
        None => Box::new(FallbackClassifier),
    }
}
