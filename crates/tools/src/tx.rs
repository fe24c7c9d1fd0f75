//! `hfdv tx`: payload file to modem samples

use crate::wav::write_iq_wav;
use anyhow::{Context, Result};
use clap::Args;
use hfdv_session::config::ModeConfig;
use hfdv_session::text_io::RepeatingText;
use hfdv_session::tx::Transmitter;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Args)]
pub struct TxArgs {
    /// Output I/Q WAV file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Raw payload file; zeros are sent when absent or exhausted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Text repeated on the side channel
    #[arg(short, long)]
    pub text: Option<String>,

    /// Number of interleave batches to send; defaults to covering the input
    #[arg(short = 'n', long = "frames")]
    pub batches: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TxSummary {
    pub batches: usize,
    pub samples: usize,
    pub payload_bytes: usize,
    pub duration_secs: f64,
}

const DEFAULT_BATCHES: usize = 25;

pub fn run_tx(args: &TxArgs, config: ModeConfig) -> Result<TxSummary> {
    let sample_rate = config.sample_rate;
    let mut tx = Transmitter::new(config).context("Failed to set up transmitter")?;

    let payload = match &args.input {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read payload file: {:?}", path))?,
        None => Vec::new(),
    };

    if let Some(text) = &args.text {
        info!("Sending text {:?}", text);
        tx.set_text_source(RepeatingText::new(text));
    }

    let bytes_per_call = tx.payload_bytes_per_call();
    let batches = match args.batches {
        Some(n) => n,
        None if payload.is_empty() => DEFAULT_BATCHES,
        None => payload.len().div_ceil(bytes_per_call),
    };

    let mut samples = Vec::with_capacity(batches * tx.samples_per_call());
    for batch in 0..batches {
        let start = (batch * bytes_per_call).min(payload.len());
        let end = (start + bytes_per_call).min(payload.len());
        samples.extend(tx.transmit(&payload[start..end]));
        debug!("Batch {} sent {} payload bytes", batch, end - start);
    }

    write_iq_wav(&samples, &args.output, sample_rate)?;

    Ok(TxSummary {
        batches,
        samples: samples.len(),
        payload_bytes: payload.len().min(batches * bytes_per_call),
        duration_secs: samples.len() as f64 / sample_rate,
    })
}
