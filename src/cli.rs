use crate::config::{Config, ValidationMode, load_config};
use crate::ir::{LayoutSpec, SpaceConfigInput};
use crate::layout::{Space, SpaceRecord, generate_layout};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::reconcile::{apply, reconcile};
use crate::validate::validate;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seatmap", version, about = "Vehicle seating layout engine")]
pub struct Args {
    /// Engine config file (JSON or JSON5)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace). SEATMAP_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the default layout for a layout spec
    Generate {
        /// Layout spec JSON file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Deck arrangement; `auto` means double when the spec has several floors
        #[arg(long = "deck", value_enum, default_value = "auto")]
        deck: Deck,

        /// Emit the spec and a per-floor summary alongside the spaces
        #[arg(long = "dump")]
        dump: bool,
    },
    /// Check a submitted layout for structural errors
    Validate {
        /// Space list JSON file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Layout spec to check bounds against
        #[arg(short = 's', long = "spec")]
        spec: Option<PathBuf>,

        /// Report every violation instead of the first
        #[arg(long = "collect-all")]
        collect_all: bool,
    },
    /// Diff a submitted layout against the stored one
    Reconcile {
        /// Submitted space list JSON file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Stored spaces JSON file
        #[arg(short = 'e', long = "existing")]
        existing: PathBuf,

        /// Layout spec JSON file
        #[arg(short = 's', long = "spec")]
        spec: PathBuf,

        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Print the stored layout after applying the plan instead of the plan
        #[arg(long = "apply")]
        apply: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deck {
    Auto,
    Single,
    Double,
}

impl Deck {
    fn resolve(self, spec: &LayoutSpec) -> bool {
        match self {
            Deck::Auto => spec.is_double_decker(),
            Deck::Single => false,
            Deck::Double => true,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run_with(args)
}

pub fn run_with(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match args.command {
        Command::Generate {
            input,
            output,
            deck,
            dump,
        } => run_generate(&config, input.as_deref(), output.as_deref(), deck, dump),
        Command::Validate {
            input,
            spec,
            collect_all,
        } => run_validate(&config, input.as_deref(), spec.as_deref(), collect_all),
        Command::Reconcile {
            input,
            existing,
            spec,
            output,
            apply,
        } => run_reconcile(
            &config,
            input.as_deref(),
            &existing,
            &spec,
            output.as_deref(),
            apply,
        ),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SEATMAP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run_generate(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    deck: Deck,
    dump: bool,
) -> Result<()> {
    let spec: LayoutSpec = read_json(input).context("reading layout spec")?;
    spec.verify()?;
    let double_decker = deck.resolve(&spec);
    let spaces = generate_layout(&spec, double_decker, &config.generator)?;
    tracing::info!(spaces = spaces.len(), double_decker, "generated layout");

    if dump {
        let dump = LayoutDump::from_layout(&spec, double_decker, &spaces);
        return match output {
            Some(path) => write_layout_dump(path, &dump),
            None => write_json(&dump, None),
        };
    }
    let records: Vec<SpaceRecord> = spaces.iter().map(SpaceRecord::from).collect();
    write_json(&records, output)
}

fn run_validate(
    config: &Config,
    input: Option<&Path>,
    spec: Option<&Path>,
    collect_all: bool,
) -> Result<()> {
    let inputs: Vec<SpaceConfigInput> = read_json(input).context("reading spaces")?;
    let spec: Option<LayoutSpec> = match spec {
        Some(path) => Some(read_json(Some(path)).context("reading layout spec")?),
        None => None,
    };
    if let Some(spec) = &spec {
        spec.verify()?;
    }
    let mode = if collect_all {
        ValidationMode::CollectAll
    } else {
        config.validation.mode
    };

    match validate(&inputs, spec.as_ref(), mode) {
        Ok(()) => {
            println!("ok: {} spaces", inputs.len());
            Ok(())
        }
        Err(err) => {
            write_json(err.violations(), None)?;
            Err(anyhow::anyhow!(
                "layout rejected with {} violation(s)",
                err.violations().len()
            ))
        }
    }
}

fn run_reconcile(
    config: &Config,
    input: Option<&Path>,
    existing: &Path,
    spec: &Path,
    output: Option<&Path>,
    apply_plan: bool,
) -> Result<()> {
    let incoming: Vec<SpaceConfigInput> = read_json(input).context("reading submitted spaces")?;
    let stored: Vec<Space> = read_json(Some(existing)).context("reading stored spaces")?;
    let spec: LayoutSpec = read_json(Some(spec)).context("reading layout spec")?;
    spec.verify()?;
    validate(&incoming, Some(&spec), config.validation.mode)?;

    let plan = reconcile(&incoming, &stored, &spec, &config.reconcile)?;
    if apply_plan {
        let applied = apply(&stored, &plan)?;
        return write_json(&applied, output);
    }
    write_json(&plan, output)
}

fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&contents)?)
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => io::stdout().write_all(json.as_bytes())?,
    }
    Ok(())
}
