//! Interactive menu for the carbon sense toolchain.
//!
//! Lets users pick an action and fill in its parameters with `dialoguer`
//! prompts instead of remembering CLI flags.

use std::path::PathBuf;

use carbon_sense_cli_utils::MultiProgress;
use dialoguer::{Confirm, Input, Select};

use crate::{
    commands::{self, DetectArgs, GenerateArgs},
    config::AppConfig,
};

/// Top-level actions offered by the menu.
enum Action {
    Generate,
    Detect,
    Verify,
}

impl Action {
    const ALL: &[Self] = &[Self::Generate, Self::Detect, Self::Verify];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Generate => "Generate synthetic anomalies",
            Self::Detect => "Detect anomalies for a drawn area",
            Self::Verify => "Run a verification session",
        }
    }
}

/// Runs the interactive menu and prints the chosen command's output.
///
/// # Errors
///
/// Returns an error if user input fails or the chosen command fails.
pub fn run(config: &AppConfig, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let output = match Action::ALL[idx] {
        Action::Generate => commands::generate(&prompt_generate()?, config)?,
        Action::Detect => commands::detect(&prompt_detect()?, config)?,
        Action::Verify => commands::verify(&prompt_detect()?, config, multi)?,
    };

    println!("{output}");

    Ok(())
}

fn prompt_generate() -> Result<GenerateArgs, Box<dyn std::error::Error>> {
    let count: usize = Input::new()
        .with_prompt("Number of anomalies")
        .default(10)
        .interact_text()?;

    let polygon = optional_path("Polygon GeoJSON file (leave empty for the default center)")?;
    let seed = optional_seed()?;

    let layers = Confirm::new()
        .with_prompt("Output map layers instead of records?")
        .default(false)
        .interact()?;

    let selected = if layers {
        let selected_str: String = Input::new()
            .with_prompt("Selected anomaly id (leave empty for none)")
            .allow_empty(true)
            .interact_text()?;
        parse_optional(&selected_str, "selected id")?
    } else {
        None
    };

    Ok(GenerateArgs {
        count,
        polygon,
        seed,
        layers,
        selected,
    })
}

fn prompt_detect() -> Result<DetectArgs, Box<dyn std::error::Error>> {
    let polygon: String = Input::new()
        .with_prompt("Polygon GeoJSON file")
        .interact_text()?;

    let carbon_stocks: f64 = Input::new()
        .with_prompt("Carbon stocks")
        .interact_text()?;

    let forest_growth: f64 = Input::new()
        .with_prompt("Forest growth")
        .interact_text()?;

    let area_str: String = Input::new()
        .with_prompt("Measured area (leave empty if not measured)")
        .allow_empty(true)
        .interact_text()?;

    Ok(DetectArgs {
        polygon: PathBuf::from(polygon.trim()),
        carbon_stocks,
        forest_growth,
        area: parse_optional(&area_str, "area")?,
        seed: optional_seed()?,
    })
}

fn optional_path(prompt: &str) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let path: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let path = path.trim();
    Ok((!path.is_empty()).then(|| PathBuf::from(path)))
}

fn optional_seed() -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let seed_str: String = Input::new()
        .with_prompt("Random seed (leave empty for a fresh one)")
        .allow_empty(true)
        .interact_text()?;

    parse_optional(&seed_str, "seed")
}

fn parse_optional<T>(input: &str, what: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        input
            .parse()
            .map_err(|e| format!("Invalid {what} '{input}': {e}"))?,
    ))
}
