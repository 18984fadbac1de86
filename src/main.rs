//! questline driver
//!
//! `questline [DATA_DIR] [SAVE_FILE]` loads definitions, restores or starts a
//! game, logs where every quest and reputation stands and writes the save back.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use questline::{
    EngineConfig, MemoryHost, QuestEngine, QuestRegistry, ReputationEngine, ReputationRegistry,
    SaveData,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("questline=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let save_path = PathBuf::from(args.next().unwrap_or_else(|| "save.json".to_string()));

    let config = EngineConfig::load_from_directory(&data_dir).unwrap_or_else(|e| {
        error!("Failed to load config: {}, using defaults", e);
        EngineConfig::default()
    });

    let mut quest_registry = QuestRegistry::new();
    if let Err(e) = quest_registry.load_from_directory(&data_dir) {
        error!("Failed to load quests: {}", e);
    }

    let mut reputation_registry = ReputationRegistry::new();
    if let Err(e) = reputation_registry.load_from_directory(&data_dir, &config.reputation) {
        error!("Failed to load reputations: {}", e);
    }

    let mut quests = QuestEngine::new(quest_registry, config.quests.clone());
    let mut reputations = ReputationEngine::new(reputation_registry, config.reputation.clone());

    if save_path.exists() {
        match SaveData::read_from(&save_path) {
            Ok(data) => data.restore_into(&mut quests, &mut reputations),
            Err(e) => {
                warn!("Could not read {:?}: {}, starting a new game", save_path, e);
                quests.on_new_game();
                reputations.reinitialize();
            }
        }
    } else {
        info!("No save at {:?}, starting a new game", save_path);
        quests.on_new_game();
        reputations.reinitialize();
    }

    let host = MemoryHost::new();

    for quest in quests.registry().all() {
        let Some(state) = quests.quest(&quest.name) else {
            continue;
        };
        let completed = quests
            .completion_date(&quest.name)
            .map(|date| format!(" on {}", date))
            .unwrap_or_default();
        info!(
            "Quest '{}': {} (stage {}){}{}",
            quest.name,
            state.status().as_str(),
            state.stage,
            if state.pinned { " [pinned]" } else { "" },
            completed
        );
    }

    for (definition, state) in reputations.all() {
        let display_name = reputations
            .display_name(&host, &definition.name, &definition.category)
            .unwrap_or_else(|| definition.name.clone());
        let rank = reputations
            .rank(&definition.name, &definition.category)
            .map(|r| r.name.as_str())
            .unwrap_or("-");
        info!(
            "Reputation '{}' ({}): {} [{}]",
            display_name, definition.category, state.value, rank
        );
    }

    if let Err(e) = SaveData::capture(&quests, &reputations).write_to(&save_path) {
        error!("Failed to write {:?}: {}", save_path, e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
