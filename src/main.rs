#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use platformer_dqn::learning::params::{DEFAULT_LEARNING_RATE, DEFAULT_LEVEL_WIDTH};
use platformer_dqn::learning::{
    run_episode, AgentConfig, AvatarStatus, DqnAgent, EpisodeConfig, LinearModel, Mode,
    ScriptedLevel,
};

#[derive(Parser)]
#[command(
    name = "platformer_dqn",
    about = "Headless DQN training on generated platform levels"
)]
struct Args {
    #[arg(long, default_value_t = 20)]
    episodes: u32,
    /// Frame cap per episode.
    #[arg(long, default_value_t = 2_000)]
    frames: u64,
    /// Seeds the agent and the level sequence; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = DEFAULT_LEVEL_WIDTH)]
    level_width: usize,
    /// JSON file with `AgentConfig` fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start every episode in small mode.
    #[arg(long, default_value_t = false)]
    small: bool,
    #[arg(long, default_value_t = false)]
    no_train: bool,
    /// Print one JSON summary per episode to stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AgentConfig::from_json_file(path)?,
        None => AgentConfig::default(),
    }
    .with_env_overrides();
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let level_seed = config.seed.unwrap_or(0);

    let mut init_rng = ChaCha8Rng::seed_from_u64(level_seed);
    let model = LinearModel::random(config.feature_len, DEFAULT_LEARNING_RATE, &mut init_rng);
    let mut agent = DqnAgent::new(model, config)?;
    let episode = EpisodeConfig {
        max_frames: args.frames,
        train: !args.no_train,
    };

    info!(episodes = args.episodes, level_seed, "starting");
    let mut wins = 0_u32;
    for i in 0..args.episodes {
        let mut level = ScriptedLevel::generate(args.level_width, level_seed.wrapping_add(u64::from(i)));
        if args.small {
            level = level.with_mode(Mode::Small);
        }
        let summary = run_episode(&mut level, &mut agent, episode)?;
        if args.json {
            println!("{}", serde_json::to_string(&summary)?);
        }
        if summary.status == AvatarStatus::Win {
            wins += 1;
        }
    }
    info!(wins, episodes = args.episodes, epsilon = agent.epsilon(), "done");
    Ok(())
}
