//! Generative mode - random rosters with unique, memorable game ids
//!
//! Everything is drawn from one ChaCha stream seeded by the options, so the
//! same options always produce the same configs.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{GameConfig, GenerateOptions};
use crate::error::ConfigurationError;

// 32 adjectives x 32 nouns; the numeric suffix keeps ids unique
const ADJECTIVES: [&str; 32] = [
    "amber", "brisk", "cobalt", "dusty", "eager", "fallow", "gilded", "hollow",
    "idle", "jolly", "keen", "lucky", "mossy", "nimble", "olive", "plain",
    "quiet", "rusty", "sandy", "tidal", "umber", "vivid", "windy", "young",
    "bold", "crisp", "deep", "frosty", "grand", "hardy", "loyal", "misty",
];

const NOUNS: [&str; 32] = [
    "harbor", "quarry", "meadow", "orchard", "ridge", "delta", "mill", "port",
    "field", "grove", "forge", "market", "bridge", "wharf", "pasture", "mine",
    "valley", "coast", "hamlet", "summit", "ford", "marsh", "heath", "isle",
    "canyon", "plateau", "barn", "depot", "kiln", "lodge", "spring", "well",
];

/// Build `num_games` configs from the options' palette and agent kinds
pub fn generate_configs(options: &GenerateOptions) -> Result<Vec<GameConfig>, ConfigurationError> {
    validate_options(options)?;

    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut seen = HashSet::with_capacity(options.num_games);
    let mut configs = Vec::with_capacity(options.num_games);

    for index in 0..options.num_games {
        let num_players = rng.gen_range(options.min_players..=options.max_players);
        let players = options.palette[..num_players]
            .iter()
            .map(|&color| {
                let kind = options.agent_kinds[rng.gen_range(0..options.agent_kinds.len())];
                kind.build(color, rng.gen())
            })
            .collect();

        let game_id = game_name(&mut rng, index);
        if !seen.insert(game_id.clone()) {
            return Err(ConfigurationError::DuplicateGameId(game_id));
        }

        configs.push(GameConfig::new(game_id, players).with_seed(rng.gen()));
    }

    tracing::debug!("Generated {} game configs (seed {})", configs.len(), options.seed);
    Ok(configs)
}

/// Two random words plus the game index, e.g. "mossy-harbor-0007"
pub fn game_name(rng: &mut ChaCha8Rng, index: usize) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{}-{}-{:04}", adjective, noun, index)
}

fn validate_options(options: &GenerateOptions) -> Result<(), ConfigurationError> {
    let invalid = |msg: String| Err(ConfigurationError::InvalidOptions(msg));

    if options.min_players == 0 || options.min_players > options.max_players {
        return invalid(format!(
            "player range {}..={} is empty",
            options.min_players, options.max_players
        ));
    }
    if options.palette.len() < options.max_players {
        return invalid(format!(
            "palette has {} colors but games may seat {}",
            options.palette.len(),
            options.max_players
        ));
    }
    let distinct: HashSet<_> = options.palette.iter().collect();
    if distinct.len() != options.palette.len() {
        return invalid("palette repeats a color".to_string());
    }
    if options.agent_kinds.is_empty() {
        return invalid("no agent kinds to draw from".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradesim_core::{AgentKind, Color};

    fn summary(configs: &[GameConfig]) -> Vec<(String, Vec<Color>, Vec<String>, u64)> {
        configs
            .iter()
            .map(|c| {
                (
                    c.game_id.clone(),
                    c.colors(),
                    c.players.iter().map(|p| p.label().to_string()).collect(),
                    c.seed,
                )
            })
            .collect()
    }

    #[test]
    fn test_generates_requested_count() {
        let configs = generate_configs(&GenerateOptions::new(25)).unwrap();
        assert_eq!(configs.len(), 25);
        for config in &configs {
            assert!((2..=4).contains(&config.players.len()));
        }
    }

    #[test]
    fn test_ids_unique() {
        let configs = generate_configs(&GenerateOptions::new(500).with_seed(3)).unwrap();
        let ids: HashSet<&str> = configs.iter().map(|c| c.game_id.as_str()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_seed_reproducible() {
        let options = GenerateOptions::new(10).with_seed(77);
        let a = generate_configs(&options).unwrap();
        let b = generate_configs(&options).unwrap();
        assert_eq!(summary(&a), summary(&b));

        let c = generate_configs(&options.clone().with_seed(78)).unwrap();
        assert_ne!(summary(&a), summary(&c));
    }

    #[test]
    fn test_palette_cycled_in_order() {
        let configs = generate_configs(&GenerateOptions::new(20)).unwrap();
        for config in &configs {
            let n = config.players.len();
            assert_eq!(config.colors(), Color::ALL[..n].to_vec());
        }
    }

    #[test]
    fn test_fixed_player_count_and_kind() {
        let options = GenerateOptions::new(5)
            .with_players(3, 3)
            .with_agent_kinds(vec![AgentKind::ResourceHoarder]);
        for config in generate_configs(&options).unwrap() {
            assert_eq!(config.players.len(), 3);
            assert!(config
                .players
                .iter()
                .all(|p| p.label() == AgentKind::ResourceHoarder.label()));
        }
    }

    #[test]
    fn test_invalid_options() {
        assert!(generate_configs(&GenerateOptions::new(1).with_players(3, 2)).is_err());
        assert!(generate_configs(&GenerateOptions::new(1).with_players(0, 2)).is_err());
        assert!(generate_configs(&GenerateOptions::new(1).with_players(2, 5)).is_err());
        assert!(generate_configs(&GenerateOptions::new(1).with_agent_kinds(vec![])).is_err());
    }

    #[test]
    fn test_game_name_format() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let name = game_name(&mut rng, 7);
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], "0007");
    }
}
