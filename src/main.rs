use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voicebank_render::audio::{Decoded, FrequencyCurve, WaveformData};
use voicebank_render::config::EngineConfig;
use voicebank_render::engine::{FrqGenerator, RenderParameterBuilder, SystemRunner};
use voicebank_render::note::Note;
use voicebank_render::song::{Song, SongNote};
use voicebank_render::voicebank::Voicebank;

#[derive(Parser)]
#[command(name = "voicebank-render", about = "Prepare voicebanks and resampler jobs")]
struct Cli {
    /// JSON engine config; defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the resampler executable from the config.
    #[arg(long, global = true)]
    resampler: Option<PathBuf>,

    /// Overrides the frq generator executable from the config.
    #[arg(long, global = true)]
    frq_generator: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a frq file and summarize it.
    Frq { path: PathBuf },
    /// Decode a wav sample and summarize it.
    Wav { path: PathBuf },
    /// Print every lyric config of a voicebank as JSON.
    List { voicebank: PathBuf },
    /// Generate frq files for samples that lack a valid one.
    Prepare { voicebank: PathBuf },
    /// Print the resampler arguments for a single note.
    RenderArgs {
        voicebank: PathBuf,
        lyric: String,
        /// Note name (`C4`) or number (`60`).
        #[arg(long, default_value = "C4")]
        note: Note,
        #[arg(long, default_value_t = 100)]
        velocity: i32,
        #[arg(long, default_value_t = 100)]
        intensity: i32,
        #[arg(long, default_value_t = 0)]
        modulation: i32,
        #[arg(long, default_value_t = 125.0)]
        tempo: f64,
        /// Note length in ms.
        #[arg(long, default_value_t = 500.0)]
        length: f64,
        #[arg(long, default_value = "")]
        flags: String,
        #[arg(long, default_value = "")]
        song_flags: String,
        #[arg(long, default_value = "")]
        pitch_bends: String,
        #[arg(long, default_value = "out.wav")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(path) = cli.resampler {
        config.resampler_path = path;
    }
    if let Some(path) = cli.frq_generator {
        config.frq_generator_path = path;
    }

    match cli.command {
        Command::Frq { path } => {
            let curve = report(FrequencyCurve::read_file(&path), &path)?;
            let nearest = Note::nearest(curve.average_pitch())
                .map_or("-".to_string(), |note| note.to_string());
            println!("samples per block: {}", curve.samples_per_block());
            println!("average pitch:     {:.2} Hz ({nearest})", curve.average_pitch());
            println!("blocks:            {}", curve.len());
        }
        Command::Wav { path } => {
            let wav = report(WaveformData::read_file(&path), &path)?;
            let peak = wav.samples().iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
            println!("length:      {:.1} ms", wav.length_ms());
            println!("sample rate: {} Hz", wav.sample_rate());
            println!("samples:     {}", wav.len());
            println!("peak:        {peak}");
        }
        Command::List { voicebank } => {
            let voicebank = Voicebank::load(voicebank)?;
            println!("{}", serde_json::to_string_pretty(&voicebank.lyric_data())?);
        }
        Command::Prepare { voicebank } => {
            let voicebank = Voicebank::load(voicebank)?;
            let generator =
                FrqGenerator::new(SystemRunner, &config.frq_generator_path, config.samples_per_frq);
            let generated = generator.generate_missing(&voicebank);
            info!(generated, "voicebank prepared");
        }
        Command::RenderArgs {
            voicebank,
            lyric,
            note,
            velocity,
            intensity,
            modulation,
            tempo,
            length,
            flags,
            song_flags,
            pitch_bends,
            output,
        } => {
            let voicebank = Voicebank::load(voicebank)?;
            let lyric_config = voicebank
                .get(&lyric)
                .ok_or_else(|| anyhow!("no sample for lyric {lyric:?}"))?;
            let song = Song::new(tempo, song_flags);
            let note = SongNote {
                note,
                velocity,
                intensity,
                modulation,
                flags,
                ..Default::default()
            };
            let params = RenderParameterBuilder::new(&song, &note)
                .lyric_config(lyric_config)
                .note_length(length)
                .pitch_bends(&pitch_bends)
                .output(&output)
                .build()?;
            println!("{}", config.resampler_path.display());
            for arg in params.to_args() {
                println!("{arg}");
            }
        }
    }
    Ok(())
}

fn report<T, E>(result: Result<Decoded<T>, E>, path: &Path) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    // Warnings were already logged by the decoder
    let decoded = result.with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(decoded.into_value())
}
