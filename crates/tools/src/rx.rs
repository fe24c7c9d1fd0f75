//! `hfdv rx`: modem samples back to payload and text

use crate::wav::read_iq_wav;
use anyhow::{Context, Result};
use clap::Args;
use hfdv_modem::common::DemodStats;
use hfdv_session::config::ModeConfig;
use hfdv_session::rx::Receiver;
use hfdv_session::stats::Statistics;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, Args)]
pub struct RxArgs {
    /// Input I/Q WAV file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write decoded payload bytes here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long)]
    pub stats_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RxSummary {
    pub frames: usize,
    pub payload_bytes: usize,
    /// Receive calls per validity verdict
    pub verdicts: BTreeMap<String, usize>,
    pub text: String,
    pub raw_ber: f64,
    pub coded_ber: f64,
    pub stats: Statistics,
    pub demod: DemodStats,
}

pub fn run_rx(args: &RxArgs, config: ModeConfig) -> Result<RxSummary> {
    let (samples, file_rate) = read_iq_wav(&args.input)?;
    if file_rate != config.sample_rate {
        warn!("File sample rate {} Hz differs from mode rate {} Hz", file_rate, config.sample_rate);
    }

    let test_frames = config.test_frames;
    let mut rx = Receiver::new(config).context("Failed to set up receiver")?;

    let text = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&text);
    rx.set_text_sink(move |ch| sink.borrow_mut().push(ch));

    let mut payload = Vec::new();
    let mut verdicts = BTreeMap::new();
    let mut frames = 0;
    let mut pos = 0;

    while pos + rx.nin() <= samples.len() {
        let nin = rx.nin();
        let outcome = rx.receive(&samples[pos..pos + nin]);
        pos += nin;
        frames += 1;

        *verdicts.entry(outcome.validity.to_string()).or_insert(0) += 1;
        if outcome.nout > 0 && outcome.validity.releases_speech() && !test_frames {
            payload.extend(rx.decoded_bytes());
        }
    }

    if pos < samples.len() {
        info!("{} trailing samples left over", samples.len() - pos);
    }

    if let Some(path) = &args.output {
        std::fs::write(path, &payload).with_context(|| format!("Failed to write payload file: {:?}", path))?;
        info!("Wrote {} payload bytes to {:?}", payload.len(), path);
    }

    let stats = rx.stats().clone();
    let text = text.borrow().clone();
    let summary = RxSummary {
        frames,
        payload_bytes: payload.len(),
        verdicts,
        text,
        raw_ber: stats.raw_ber(),
        coded_ber: stats.coded_ber(),
        stats,
        demod: rx.demod_stats(),
    };

    if let Some(path) = &args.stats_json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write stats file: {:?}", path))?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{run_tx, TxArgs};
    use tempfile::TempDir;

    #[test]
    fn test_file_link() {
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("link.wav");
        let payload_in = dir.path().join("payload.bin");
        let payload_out = dir.path().join("decoded.bin");
        let stats = dir.path().join("stats.json");

        let payload: Vec<u8> = (0..39 * 12).map(|i| (i * 7 + 3) as u8).collect();
        std::fs::write(&payload_in, &payload).unwrap();

        let tx_args = TxArgs {
            output: wav.clone(),
            input: Some(payload_in),
            text: Some("test ".to_string()),
            batches: None,
        };
        let sent = run_tx(&tx_args, ModeConfig::default()).unwrap();
        assert_eq!(sent.batches, 12);

        let rx_args = RxArgs {
            input: wav,
            output: Some(payload_out.clone()),
            stats_json: Some(stats.clone()),
        };
        let summary = run_rx(&rx_args, ModeConfig::default()).unwrap();
        assert_eq!(summary.frames, 12);

        // The first frame is spent finding sync
        let decoded = std::fs::read(&payload_out).unwrap();
        assert_eq!(decoded.len(), 39 * 11);
        assert_eq!(decoded[..], payload[39..]);

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(stats).unwrap()).unwrap();
        assert_eq!(json["frames"], 12);
        assert_eq!(json["verdicts"]["good"], 11);
    }
}
