//! CLI definitions.

pub mod menu;

use clap::{Parser, ValueEnum};
use pipeline_core::StageId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stockdna")]
#[command(author, version, about = "Staged pipeline from stock symbols to a model-ready dataset")]
pub struct Cli {
    /// Settings file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the settings file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Enter the interactive menu instead of one-shot dispatch
    #[arg(short, long)]
    pub menu: bool,

    /// Run stock symbol verification
    #[arg(long = "stock_symbol_verification")]
    pub stock_symbol_verification: bool,

    /// CSV filename for the base symbol reference
    #[arg(long = "train_base_filename", default_value = "train_base.csv")]
    pub train_base_filename: PathBuf,

    /// Run stock data collection
    #[arg(long = "collect_stock_data")]
    pub collect_stock_data: bool,

    /// CSV filename holding the verified symbol list
    #[arg(long = "train_filename", default_value = "train.csv")]
    pub train_filename: PathBuf,

    /// Collection window start (YYYY-MM-DD)
    #[arg(long = "start_time", default_value = "2022-01-01")]
    pub start_time: String,

    /// Collection window end (YYYY-MM-DD, exclusive)
    #[arg(long = "end_time", default_value = "2023-10-01")]
    pub end_time: String,

    /// Run the preprocessor
    #[arg(long)]
    pub preprocess: bool,

    /// Run stock DNA feature extraction
    #[arg(long = "stock_dna")]
    pub stock_dna: bool,

    /// Run train preparation
    #[arg(long = "train_preparation")]
    pub train_preparation: bool,

    /// Run model training
    #[arg(long)]
    pub train: bool,

    /// Run model prediction
    #[arg(long)]
    pub predict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Cli {
    /// Stage flags mapped to identifiers, in canonical order.
    pub fn requested_stages(&self) -> Vec<StageId> {
        let flags = [
            (self.stock_symbol_verification, StageId::SymbolVerification),
            (self.collect_stock_data, StageId::DataCollection),
            (self.preprocess, StageId::Preprocess),
            (self.stock_dna, StageId::Dna),
            (self.train_preparation, StageId::TrainPreparation),
            (self.train, StageId::Train),
            (self.predict, StageId::Predict),
        ];
        flags
            .into_iter()
            .filter_map(|(enabled, id)| enabled.then_some(id))
            .collect()
    }
}
