// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `predict` and `evaluate`.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::WeightInit;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train one network from a features file and a labels file
    Train(TrainArgs),

    /// Print the class distribution for one feature vector as JSON
    Predict(PredictArgs),

    /// Report held-out accuracy of a saved checkpoint
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Whitespace-separated feature rows
    pub features: PathBuf,

    /// Whitespace-separated label rows, one per feature row
    pub labels: PathBuf,

    /// Root directory for checkpoints
    pub output_dir: PathBuf,

    /// Network name; checkpoints go to <OUTPUT_DIR>/<NAME>
    pub name: String,

    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Passes over the training rows; fractions allowed
    #[arg(long, default_value_t = 5.0)]
    pub epochs: f64,

    /// Trailing rows held out for evaluation
    #[arg(long, default_value_t = 10_000)]
    pub test_size: usize,

    #[arg(long, default_value_t = 1e-4)]
    pub learning_rate: f64,

    /// Multiplier applied every --decay-steps steps
    #[arg(long, default_value_t = 0.96)]
    pub decay_rate: f64,

    /// 0 disables decay
    #[arg(long, default_value_t = 10_000)]
    pub decay_steps: usize,

    /// Dropout keep probability on hidden activations
    #[arg(long, default_value_t = 0.8)]
    pub keep_prob: f64,

    /// Steps between held-out evaluations; 0 evaluates only at the end
    #[arg(long, default_value_t = 1_000)]
    pub update_interval: usize,

    /// Hidden width = round((features + classes) * ratio)
    #[arg(long, default_value_t = 0.66)]
    pub hidden_ratio: f64,

    #[arg(long, default_value_t = 1)]
    pub hidden_layers: usize,

    /// xavier or zeros
    #[arg(long, default_value = "xavier")]
    pub weight_init: WeightInit,

    #[arg(long, default_value_t = 0.1)]
    pub bias_init: f64,

    /// Fail unless feature rows have exactly this width
    #[arg(long)]
    pub feature_count: Option<usize>,

    /// Fail unless label rows have exactly this width
    #[arg(long)]
    pub class_count: Option<usize>,

    /// Always parse the text files, ignoring and not writing the binary cache
    #[arg(long)]
    pub no_cache: bool,

    /// Log failed checkpoint writes and keep training
    #[arg(long)]
    pub continue_on_save_error: bool,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            features_path:   a.features,
            labels_path:     a.labels,
            output_dir:      a.output_dir,
            name:            a.name,
            batch_size:      a.batch_size,
            epochs:          a.epochs,
            test_size:       a.test_size,
            learning_rate:   a.learning_rate,
            decay_rate:      a.decay_rate,
            decay_steps:     a.decay_steps,
            keep_prob:       a.keep_prob,
            update_interval: a.update_interval,
            hidden_ratio:    a.hidden_ratio,
            hidden_layers:   a.hidden_layers,
            weight_init:     a.weight_init,
            bias_init:       a.bias_init,
            feature_count:   a.feature_count,
            class_count:     a.class_count,
            use_cache:       !a.no_cache,
            halt_on_persistence_error: !a.continue_on_save_error,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Root directory the network was trained into
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Network name, e.g. preflop
    #[arg(long)]
    pub name: String,

    /// Use the parameters from the end of the run instead of the best ones
    #[arg(long = "final")]
    pub use_final: bool,

    /// Feature values
    #[arg(last = true, required = true, allow_negative_numbers = true)]
    pub values: Vec<f32>,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    pub features: PathBuf,

    pub labels: PathBuf,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    #[arg(long)]
    pub name: String,

    #[arg(long = "final")]
    pub use_final: bool,

    /// Trailing rows to score
    #[arg(long, default_value_t = 10_000)]
    pub test_size: usize,

    /// Always parse the text files, ignoring and not writing the binary cache
    #[arg(long)]
    pub no_cache: bool,
}
