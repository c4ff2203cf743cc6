// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and delegates to Layer 2.
//
//   1. `train`    — trains one network and writes its checkpoint
//   2. `predict`  — loads a checkpoint and prints a distribution
//   3. `evaluate` — scores a checkpoint on held-out rows

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

use crate::application::{
    predict_use_case::{evaluate_checkpoint, PredictorRegistry},
    train_use_case::TrainUseCase,
};
use crate::domain::traits::argmax;
use crate::infra::checkpoint::{CheckpointKind, CheckpointManager};

#[derive(Parser, Debug)]
#[command(
    name = "pokernet",
    version,
    about = "Train and query hand-class estimator networks for a poker bot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn kind(use_final: bool) -> CheckpointKind {
    if use_final { CheckpointKind::Final } else { CheckpointKind::Best }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Training '{}' from '{}'", args.name, args.features.display());

    let result = TrainUseCase::new(args.into()).execute()?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let registry     = PredictorRegistry::load(&args.checkpoint_dir, &[&args.name], kind(args.use_final))?;
    let distribution = registry.evaluate(&args.name, &args.values)?;

    if let Some(best) = argmax(&distribution) {
        tracing::info!("Most likely class {} (p={:.4})", best, distribution[best]);
    }
    println!("{}", serde_json::to_string(&distribution)?);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let manager  = CheckpointManager::open(&args.checkpoint_dir, &args.name);
    let accuracy = evaluate_checkpoint(
        &args.features,
        &args.labels,
        &manager,
        kind(args.use_final),
        args.test_size,
        !args.no_cache,
    )?;

    println!("{accuracy:.6}");
    Ok(())
}
