//! saavy-sampler - play a sample file chromatically through the default output
//!
//! Run with: cargo run --bin saavy-sampler -- path/to/sample.wav

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use saavy_sampler::{EngineConfig, SamplerEngine, SamplerState, VoiceStealing, MAX_BLOCK_SIZE};

#[derive(Debug, Parser)]
#[command(name = "saavy-sampler", about = "Polyphonic sample player")]
struct Args {
    /// Audio file to load. Plays a built-in sine when omitted.
    sample: Option<PathBuf>,

    /// Notes of the phrase, as MIDI note numbers.
    #[arg(short, long, value_delimiter = ',', default_values_t = [60u8, 64, 67, 72, 67, 64, 60])]
    notes: Vec<u8>,

    /// Length of each note in milliseconds.
    #[arg(long, default_value_t = 300)]
    note_ms: u64,

    #[arg(long, default_value_t = 100)]
    velocity: u8,

    /// Output volume, 0.0 to 1.0.
    #[arg(long, default_value_t = saavy_sampler::state::DEFAULT_VOLUME)]
    volume: f32,

    /// Tuning offset in semitones, -12 to 12.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    tuning: f32,

    #[arg(long, default_value_t = saavy_sampler::DEFAULT_POLYPHONY)]
    polyphony: usize,

    /// Let notes ring over each other instead of releasing them.
    #[arg(long)]
    hold: bool,

    /// Drop new notes instead of stealing when all voices are busy.
    #[arg(long)]
    no_steal: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "opened output device");

    let stealing = if args.no_steal {
        VoiceStealing::Disabled
    } else {
        VoiceStealing::Oldest
    };
    let engine_config = EngineConfig::new()
        .polyphony(args.polyphony)
        .output_channels(channels)
        .stealing(stealing)
        .fallback_tone(true)
        .initial_state(SamplerState {
            volume: args.volume,
            tuning: args.tuning,
        });
    let (mut engine, mut handle) =
        SamplerEngine::new(engine_config).wrap_err("failed to build sampler engine")?;

    if let Some(path) = &args.sample {
        match handle.request_load(path.clone()).wait() {
            Ok(sample) => {
                if sample.sample_rate != sample_rate {
                    warn!(
                        file_rate = sample.sample_rate,
                        device_rate = sample_rate,
                        "sample rate differs from device, pitch will be off"
                    );
                }
                info!(name = %sample.name, frames = sample.frame_count, "sample loaded");
            }
            Err(err) => warn!(error = %err, "falling back to built-in tone"),
        }
    }

    // Planar scratch, sized once. The callback never allocates.
    let mut scratch = vec![vec![0.0f32; MAX_BLOCK_SIZE]; channels];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                engine.render(&mut scratch, &[], frames);

                let out_off = frames_written * channels;
                for i in 0..frames {
                    for (ch, buffer) in scratch.iter().enumerate() {
                        data[out_off + i * channels + ch] = buffer[i];
                    }
                }

                frames_written += frames;
            }
        },
        |err| error!(error = %err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    let note_len = Duration::from_millis(args.note_ms);
    for &note in &args.notes {
        handle.note_on(note, args.velocity);
        thread::sleep(note_len);
        if !args.hold {
            handle.note_off(note);
        }
    }

    // Let the tail of the last sample ring out.
    thread::sleep(Duration::from_secs(1));
    info!(
        dropped_events = handle.dropped_events(),
        state = ?handle.state(),
        "phrase finished"
    );
    Ok(())
}
