//! Commands that only read configuration

use anyhow::Result;
use cw_config::Config;
use cw_core::names::random_player_name;
use cw_core::DeckCatalog;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Serialize)]
struct DeckSummary<'a> {
    name: &'a str,
    words: usize,
    selected: bool,
}

/// List every deck the catalog knows, marking the configured selection
pub fn cmd_decks(config: &Config, json: bool) -> Result<()> {
    let catalog = DeckCatalog::from_config(config);
    let summaries: Vec<DeckSummary> = catalog
        .specs()
        .iter()
        .map(|spec| DeckSummary {
            name: &spec.name,
            words: spec.words.len(),
            selected: config.game.decks.iter().any(|d| d == &spec.name),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for deck in &summaries {
        let marker = if deck.selected { "*" } else { " " };
        println!("{} {:<20} {:>4} words", marker, deck.name, deck.words);
    }
    Ok(())
}

pub fn cmd_name(config: &Config, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let catalog = DeckCatalog::from_config(config);
    println!("{}", random_player_name(&catalog, &mut rng));
    Ok(())
}

pub fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
