use chatshot::{EngineConfig, RenderConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "Usage: chatshot <config.json> [output.png]";
const DEMO_OUTPUT: &str = "demo-screenshot.png";

const CONFIG_HELP: &str = r#"Examples:
  chatshot chat.json shot.png
  chatshot --demo
  cat chat.json | chatshot - shot.png

Config JSON format:
{
  "chatName": "Jarvis",
  "status": "online",
  "isBot": true,
  "avatarEmoji": "🤖",
  "theme": "dark",
  "messages": [
    { "text": "Hello!", "incoming": true, "time": "09:41" },
    { "text": "Hi there", "incoming": false, "time": "09:42", "read": true }
  ]
}

Optional keys: avatarUrl, width (480), height (auto, max 1200), scale (2),
fullPage, statusTime. Set RUST_LOG to control log output."#;

/// Render a chat conversation screenshot from a JSON description
#[derive(Parser)]
#[command(name = "chatshot", version, about, after_help = CONFIG_HELP)]
struct Cli {
    /// Conversation config file, or `-` to read it from stdin
    config: Option<String>,

    /// Where to write the PNG
    #[arg(default_value = "screenshot.png")]
    output: PathBuf,

    /// Render the built-in demo conversation to demo-screenshot.png
    #[arg(long)]
    demo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

enum Source {
    Demo,
    Stdin,
    File(PathBuf),
}

impl Source {
    fn load(&self) -> chatshot::Result<RenderConfig> {
        match self {
            Source::Demo => Ok(RenderConfig::demo()),
            Source::Stdin => RenderConfig::from_reader(std::io::stdin().lock()),
            Source::File(path) => RenderConfig::from_path(path),
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn run(source: Source, output: PathBuf) -> chatshot::Result<PathBuf> {
    chatshot::check_available(&EngineConfig::default())?;
    let config = source.load()?;
    log::debug!("Loaded config with {} messages", config.messages.len());
    chatshot::generate_screenshot(&config, output)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(cli.verbose);

    let (source, output) = match (cli.demo, cli.config) {
        (true, _) => (Source::Demo, PathBuf::from(DEMO_OUTPUT)),
        (false, Some(arg)) if arg == "-" => (Source::Stdin, cli.output),
        (false, Some(arg)) => (Source::File(PathBuf::from(arg)), cli.output),
        (false, None) => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(source, output) {
        Ok(path) => {
            println!("Screenshot saved: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
