//! text-to-audio - Convert PDF, web page, or plain text into narrated WAV files

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use text_to_audio::config::AppConfig;
use text_to_audio::extract::{DocumentExtractor, Extractor};
use text_to_audio::optimize::{LlmOptimizer, TextOptimizer};
use text_to_audio::text::{TextStats, chunk_count};
use text_to_audio::tts::azure::AzureSpeechBackend;
use text_to_audio::tts::{AVAILABLE_VOICES, TtsOptions, find_voice};
use text_to_audio::{Converter, SourceDescriptor};

#[derive(Parser, Debug)]
#[command(name = "text-to-audio")]
#[command(about = "Convert PDF, web page, or plain text into narrated WAV files", long_about = None)]
#[command(version)]
struct Args {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory for session folders (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Speaking rate (0.5-2.0, default: from config)
    #[arg(long)]
    rate: Option<f32>,

    /// Voice name or short label, e.g. "guy" (see `voices`)
    #[arg(long)]
    voice: Option<String>,

    /// Skip rewriting the text for listening
    #[arg(long, default_value_t = false)]
    no_optimize: bool,

    /// Extra instructions for the optimization prompt
    #[arg(long)]
    instructions: Option<String>,

    /// LLM preset for optimization (see llm.toml)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum characters per chunk (default: from config)
    #[arg(long)]
    max_length: Option<usize>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the text comes from. At most one may be given.
#[derive(ClapArgs, Debug, Default)]
#[group(multiple = false)]
struct InputArgs {
    /// PDF file to narrate
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Web page to narrate
    #[arg(long)]
    url: Option<String>,

    /// Text to narrate
    #[arg(long)]
    text: Option<String>,

    /// Plain text file to narrate
    #[arg(long)]
    text_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available voices
    Voices,
    /// Show text statistics and the number of chunks it would produce
    Stats {
        #[command(flatten)]
        input: InputArgs,

        /// Maximum characters per chunk (default: from config)
        #[arg(long)]
        max_length: Option<usize>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice name or short label
        voice: String,
    },
    /// Set default speaking rate
    SetRate {
        /// Value (0.5-2.0)
        value: f32,
    },
    /// Set default output directory
    SetOutputDir {
        /// Directory for session folders
        path: PathBuf,
    },
    /// Enable or disable text optimization by default
    SetOptimize {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Credentials may live in a local .env
    dotenvy::dotenv().ok();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &args.command {
        Some(Commands::Voices) => {
            list_voices();
            return Ok(());
        }
        Some(Commands::Stats { input, max_length }) => {
            return show_stats(input, *max_length).await;
        }
        Some(Commands::Config { action }) => {
            return handle_config_command(action);
        }
        None => {}
    }

    let config = AppConfig::load().context("Failed to load configuration")?;

    let (text, source) = read_input(&args.input).await?;

    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let max_length = args.max_length.unwrap_or(config.max_chunk_length);
    let voice = match &args.voice {
        Some(query) => find_voice(query)
            .map(str::to_string)
            .unwrap_or_else(|| query.clone()),
        None => config.voice.clone(),
    };
    let options = TtsOptions::new()
        .with_voice(voice)
        .with_speech_rate(args.rate.unwrap_or(config.speech_rate));
    let optimize = config.optimize && !args.no_optimize;

    if args.debug {
        eprintln!("Source: {} ({})", source.name, source.kind);
        eprintln!("Output: {}", output_dir.display());
        eprintln!("Voice: {:?}", options.voice);
        eprintln!("Rate: {}", options.speech_rate);
        eprintln!("Max chunk length: {}", max_length);
        eprintln!("Optimize: {}", optimize);
    }

    let credentials = config
        .azure_speech
        .resolve()
        .context("Azure Speech is not configured")?;
    let backend = AzureSpeechBackend::new(&credentials, options.voice.as_deref())
        .context("Failed to initialize Azure Speech")?;

    let mut converter = Converter::new(Box::new(backend), output_dir).with_max_length(max_length);

    if optimize {
        let preset = args.model.as_deref().or(config.llm_preset.as_deref());
        let instructions = args
            .instructions
            .as_deref()
            .or(config.custom_instructions.as_deref())
            .unwrap_or_default();
        let optimizer = LlmOptimizer::from_config(preset).map(|optimizer| {
            Box::new(optimizer.with_instructions(instructions)) as Box<dyn TextOptimizer>
        });
        converter = converter.try_with_optimizer(optimizer);
        if converter.has_optimizer() {
            eprintln!("Optimizing text for listening...");
        }
    }

    let stats = TextStats::of(&text);
    eprintln!(
        "Text: {} characters, {} words, {} lines",
        stats.characters, stats.words, stats.lines
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Synthesizing");

    let result = converter
        .convert_with_progress(&text, &source, &options, optimize, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;

    let result = match result {
        Ok(result) => {
            pb.finish_with_message("Done");
            result
        }
        Err(e) => {
            pb.abandon();
            return Err(e).context("Conversion failed");
        }
    };

    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }

    let size_mb = result.total_bytes() as f64 / (1024.0 * 1024.0);
    eprintln!(
        "\nOutput: {} ({} file(s), {:.1} MB)",
        result.directory.display(),
        result.file_count(),
        size_mb
    );
    for name in result.file_names() {
        println!("{}", name);
    }

    Ok(())
}

/// Read the requested input and describe where it came from.
async fn read_input(input: &InputArgs) -> Result<(String, SourceDescriptor)> {
    if let Some(path) = &input.pdf {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read PDF: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        eprintln!("Extracting text from PDF: {}", path.display());
        let text = Extractor::new()?.extract_from_pdf(bytes).await?;
        return Ok((text, SourceDescriptor::pdf(file_name)));
    }

    if let Some(url) = &input.url {
        eprintln!("Extracting text from URL: {}", url);
        let text = Extractor::new()?.extract_from_url(url).await?;
        return Ok((text, SourceDescriptor::url(url.clone())));
    }

    if let Some(text) = &input.text {
        return Ok((text.clone(), SourceDescriptor::text()));
    }

    if let Some(path) = &input.text_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?;
        return Ok((text, SourceDescriptor::text()));
    }

    anyhow::bail!(
        "An input is required: --pdf, --url, --text, or --text-file. Run 'text-to-audio --help' for usage."
    )
}

fn list_voices() {
    let config = AppConfig::load().unwrap_or_default();
    for (label, name) in AVAILABLE_VOICES {
        let marker = if *name == config.voice { "*" } else { " " };
        println!("{} {:<22} {}", marker, name, label);
    }
}

async fn show_stats(input: &InputArgs, max_length: Option<usize>) -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    let max_length = max_length.unwrap_or(config.max_chunk_length);

    let (text, _) = read_input(input).await?;
    let stats = TextStats::of(&text);
    let chunks = chunk_count(&text, max_length);

    println!("characters = {}", stats.characters);
    println!("words = {}", stats.words);
    println!("lines = {}", stats.lines);
    println!("chunks = {} (max {} characters each)", chunks, max_length);
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            println!("Configuration file: {:?}", AppConfig::config_path()?);
            println!();
            println!("output_dir = \"{}\"", config.output_dir.display());
            println!("voice = \"{}\"", config.voice);
            println!("speech_rate = {}", config.speech_rate);
            println!("max_chunk_length = {}", config.max_chunk_length);
            println!("optimize = {}", config.optimize);
            match &config.custom_instructions {
                Some(instructions) => println!("custom_instructions = \"{}\"", instructions),
                None => println!("custom_instructions = (none)"),
            }
            match &config.llm_preset {
                Some(preset) => println!("llm_preset = \"{}\"", preset),
                None => println!("llm_preset = (program default)"),
            }
            let key = if config.azure_speech.key.is_some() {
                "(set)"
            } else {
                "(from AZURE_SPEECH_KEY)"
            };
            println!("azure_speech.key = {}", key);
            match &config.azure_speech.region {
                Some(region) => println!("azure_speech.region = \"{}\"", region),
                None => println!("azure_speech.region = (from AZURE_SPEECH_REGION)"),
            }
        }
        ConfigAction::SetVoice { voice } => {
            let name = find_voice(voice)
                .ok_or_else(|| anyhow::anyhow!("Unknown voice: {}. Run 'text-to-audio voices'.", voice))?;
            let mut config = AppConfig::load()?;
            config.voice = name.to_string();
            config.save()?;
            println!("Default voice set to: {}", name);
        }
        ConfigAction::SetRate { value } => {
            let mut config = AppConfig::load()?;
            config.speech_rate = value.clamp(0.5, 2.0);
            config.save()?;
            println!("Default speaking rate set to: {}", config.speech_rate);
        }
        ConfigAction::SetOutputDir { path } => {
            let mut config = AppConfig::load()?;
            config.output_dir = path.clone();
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
        ConfigAction::SetOptimize { enabled } => {
            let mut config = AppConfig::load()?;
            config.optimize = *enabled;
            config.save()?;
            println!("Text optimization {}", if *enabled { "enabled" } else { "disabled" });
        }
    }
    Ok(())
}
