//! HFDV - transmit and receive tool for the HF digital voice modem

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use hfdv_session::config::ModeConfig;
use hfdv_tools::{load_mode_config, run_rx, run_tx, ModeOverrides, RxArgs, TxArgs};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "hfdv")]
#[command(about = "HF digital voice modem transmit and receive tool")]
#[command(version)]
struct Cli {
    /// Mode configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Per-frame diagnostics: -v while searching, -vv always
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    overrides: ModeOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modulate a payload file into an I/Q WAV file
    Tx(TxArgs),
    /// Demodulate an I/Q WAV file
    Rx(RxArgs),
    /// Show the frame layout of the selected mode
    Info,
    /// Write the selected mode as a TOML file
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Destination file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose > 0 {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_mode_config(cli.config.as_deref(), &cli.overrides, cli.verbose)?;

    match cli.command {
        Commands::Tx(args) => {
            info!("Transmitting to {:?}", args.output);
            let summary = run_tx(&args, config)?;
            println!(
                "✓ {} batches, {} samples ({:.1} s) written to {:?}",
                summary.batches, summary.samples, summary.duration_secs, args.output
            );
        }

        Commands::Rx(args) => {
            info!("Receiving from {:?}", args.input);
            let summary = run_rx(&args, config)?;
            println!("✓ {} frames processed", summary.frames);
            for (verdict, count) in &summary.verdicts {
                println!("  {:<12} {}", verdict, count);
            }
            println!("  payload bytes {}", summary.payload_bytes);
            if summary.stats.total_bits > 0 {
                println!("  raw BER   {:.5} ({} bits)", summary.raw_ber, summary.stats.total_bits);
            }
            if summary.stats.total_bits_coded > 0 {
                println!("  coded BER {:.5} ({} bits)", summary.coded_ber, summary.stats.total_bits_coded);
            }
            if !summary.text.is_empty() {
                println!("  text: {}", summary.text);
            }
        }

        Commands::Info => show_info(&config)?,

        Commands::Config(args) => {
            config
                .save_to_file(&args.output)
                .with_context(|| format!("Failed to write mode to {:?}", args.output))?;
            println!("✓ Mode written to {:?}", args.output);
        }
    }

    Ok(())
}

fn show_info(config: &ModeConfig) -> Result<()> {
    let g = config.geometry()?;
    let ofdm = config.ofdm_config()?;

    println!("\n=== Modem ===");
    println!("  Carriers:        {}", ofdm.carriers);
    println!("  Rows per frame:  {} data + 1 pilot", ofdm.data_rows);
    println!("  Samples/frame:   {}", ofdm.samples_per_frame());
    println!("  Frame duration:  {:.1} ms", ofdm.frame_duration_secs() * 1000.0);

    println!("\n=== Frame ===");
    println!("  Bits per frame:  {}", g.bits_per_frame);
    println!("  Unique word:     {} bits", g.uw_bits);
    println!("  Text:            {} bits", g.text_bits);
    println!("  Payload:         {} bits", g.data_bits_per_frame);
    println!("  Parity:          {} bits", g.parity_bits);
    println!("  LDPC code:       ({}, {}), {} padding bits",
        g.ldpc_coded_bits_per_frame(), g.ldpc_data_bits_per_frame, g.unused_data_bits());
    println!("  Interleave:      {} frames", g.interleave_frames);

    let rate = g.data_bits_per_frame as f64 / ofdm.frame_duration_secs();
    println!("\n  Payload rate:    {:.0} bit/s", rate);
    Ok(())
}
