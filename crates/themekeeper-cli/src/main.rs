//! `themekeeper`: inspect, switch and watch the persisted theme.

mod render;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use themekeeper::{
    css_root_block, generate_safelist, Document, FileStorage, FollowSystem, PreviewType,
    StorageBackend, StyleTarget, ThemeCore, ThemeIndicator, ThemeOptions, ThemeSelector,
    ThemeToggle, ToggleLabel,
};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "THEMEKEEPER_LOG";

#[derive(Debug, Parser)]
#[command(name = "themekeeper", version, about = "Inspect, switch and watch themes")]
struct Cli {
    /// Options file (.json, .yaml or .yml)
    #[arg(long, global = true, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Directory holding the durable theme store
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the available themes
    List {
        /// Show color previews
        #[arg(long)]
        preview: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the active theme
    Current,
    /// Switch to a theme
    Set { name: String },
    /// Switch to THEME_A, or away from it when it is active
    Toggle {
        theme_a: Option<String>,
        theme_b: Option<String>,
    },
    /// Forget the persisted theme
    Reset,
    /// Print the custom properties of the active theme
    Css,
    /// Print every class a CSS purger must keep
    Safelist,
    /// Follow the OS preference and schedule, announcing changes
    Watch {
        /// Stop after this many seconds
        #[arg(long = "for", value_name = "SECS")]
        duration: Option<u64>,
        /// Follow the OS preference even if the options do not
        #[arg(long)]
        follow: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_options(cli: &Cli) -> Result<ThemeOptions> {
    let mut options = match &cli.options {
        Some(path) => ThemeOptions::from_path(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => ThemeOptions::new(),
    };
    if let Some(dir) = &cli.data_dir {
        let files: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(dir));
        options = options.storage_backend(files);
    }
    Ok(options)
}

fn build_core(options: ThemeOptions, document: &Arc<Document>) -> ThemeCore {
    ThemeCore::builder(options)
        .style_target(Arc::clone(document) as Arc<dyn StyleTarget>)
        .build()
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let mut options = load_options(&cli)?;
    if let Command::Watch { follow: true, .. } = cli.command {
        options = options.follow_system_preference(FollowSystem::Always);
    }
    let document = Arc::new(Document::new());
    let core = build_core(options, &document);
    let handle = core.handle();
    tracing::debug!(command = ?cli.command, theme = %handle.theme(), "running command");

    match cli.command {
        Command::List { preview, json } => {
            let mut selector = ThemeSelector::new();
            if preview {
                selector = selector.preview(PreviewType::ColorCircles);
            }
            let options = selector.options(&handle);
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&options)?)?;
            } else {
                write!(out, "{}", render::selector(&options, true))?;
            }
        }
        Command::Current => {
            let state = ThemeToggle::new()
                .label(ToggleLabel::Default)
                .state(&handle);
            writeln!(out, "{}", render::current(&handle.theme(), &state))?;
        }
        Command::Set { name } => {
            if !handle.is_theme_available(&name) {
                bail!(
                    "unknown theme '{}' (available: {})",
                    name,
                    handle.available_themes().join(", ")
                );
            }
            writeln!(out, "{}", handle.set_theme(&name))?;
        }
        Command::Toggle { theme_a, theme_b } => {
            let applied = match theme_a {
                Some(theme_a) => handle.toggle_theme(&theme_a, theme_b.as_deref()),
                None => ThemeToggle::new().activate(&handle),
            };
            writeln!(out, "{}", applied)?;
        }
        Command::Reset => {
            handle.forget_persisted_theme();
            writeln!(out, "forgot persisted theme")?;
        }
        Command::Css => {
            let theme = handle.theme();
            writeln!(out, "/* data-theme=\"{}\" */", theme)?;
            let css = css_root_block(&document.properties()).context("rendering stylesheet")?;
            writeln!(out, "{}", css)?;
        }
        Command::Safelist => {
            for class in generate_safelist(handle.registry()) {
                writeln!(out, "{}", class)?;
            }
        }
        Command::Watch { duration, .. } => {
            watch(&core, duration.map(Duration::from_secs), out)?;
        }
    }

    core.destroy();
    Ok(())
}

fn watch(core: &ThemeCore, duration: Option<Duration>, out: &mut impl Write) -> Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    let _subscription = core.subscribe(move |name, _| {
        let _ = tx.send(name.to_string());
    });

    let mut indicator = ThemeIndicator::new();
    indicator.observe(&core.theme(), Instant::now());
    writeln!(out, "{}", core.theme())?;
    out.flush()?;

    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        let wait = match deadline {
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(left) => left,
                None => break,
            },
            None => Duration::from_secs(3600),
        };
        match rx.recv_timeout(wait) {
            Ok(theme) => {
                if indicator.observe(&theme, Instant::now()) {
                    if let Some(line) = render::indicator(&indicator) {
                        writeln!(out, "{}", line)?;
                        out.flush()?;
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}
