use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use la_matriu::{
    Clock, Command, Effect, ExerciseController, FileStore, GeminiClient, KvStore, MemoryStore,
    Storage, SystemClock,
    config::AppConfig,
    render::{render_effect, render_state, render_transcript},
    repl::{HELP, Input, parse_input},
};
use rand::{SeedableRng, rngs::StdRng};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "la-matriu")]
#[command(about = "Class interval exercise with the Oracle tutor")]
struct Args {
    /// Keep the dataset and results in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Seed for dataset generation
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout belongs to the exercise
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .parse_lossy(
            std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| "la_matriu=info".to_string()),
        );

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let config = Arc::new(config);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run(config, args))
}

fn open_storage(config: &AppConfig, ephemeral: bool, clock: Arc<dyn Clock>) -> Storage {
    let local: Box<dyn KvStore> = Box::new(FileStore::new(&config.storage.local_path));
    let session: Box<dyn KvStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(&config.storage.session_path))
    };
    tracing::debug!(
        "Storage: local={}, session={}",
        config.storage.local_path.display(),
        if ephemeral {
            "memory".to_string()
        } else {
            config.storage.session_path.display().to_string()
        }
    );

    Storage::new(
        local,
        session,
        clock,
        Duration::seconds(config.storage.recency_window_secs),
    )
}

async fn run(config: Arc<AppConfig>, args: Args) -> Result<()> {
    tracing::info!("Starting La Matriu");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let storage = open_storage(&config, args.ephemeral, clock.clone());
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let client = GeminiClient::new(&config.tutor, &config.network)?;
    tracing::info!("Tutor endpoint: {}", client.endpoint());

    let (mut controller, effects) = ExerciseController::new(config.clone(), storage, clock, rng);
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

    println!("{}", render_state(controller.state(), controller.language()));
    present(&effects, &controller, &client, &tx);
    println!("(help)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(Input::Command(command)) => {
                        let effects = controller.update(command);
                        present(&effects, &controller, &client, &tx);
                    }
                    Ok(Input::Show) => {
                        println!("{}", render_state(controller.state(), controller.language()));
                    }
                    Ok(Input::History) => {
                        println!("{}", render_transcript(controller.chat(), controller.language()));
                    }
                    Ok(Input::Help) => println!("{}", HELP),
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Err(e) => println!("[!!] {}", e),
                }
            }
            Some(command) = rx.recv() => {
                println!();
                let effects = controller.update(command);
                present(&effects, &controller, &client, &tx);
            }
        }
    }

    tracing::info!("Bye");
    Ok(())
}

fn prompt() -> Result<()> {
    print!("matriu> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// Print what can be shown and start the tutor calls the controller asked for.
fn present(
    effects: &[Effect],
    controller: &ExerciseController,
    client: &GeminiClient,
    tx: &mpsc::UnboundedSender<Command>,
) {
    let language = controller.language();
    for effect in effects {
        if let Effect::RequestChat { id, prompt, key } = effect {
            let client = client.clone();
            let tx = tx.clone();
            let (id, prompt, key) = (*id, prompt.clone(), key.clone());
            tokio::spawn(async move {
                let result = client.generate(&key, &prompt).await;
                let _ = tx.send(Command::ChatCompleted { id, result });
            });
        }
        if let Some(text) = render_effect(effect, language) {
            println!("{}", text);
        }
    }
}
