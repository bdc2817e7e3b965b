use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;

use actiongate::config::{self, AppConfig};
use actiongate::gate::providers::HostSnapshot;
use actiongate::gate::{ActionContext, ActionGate, FocusTarget, Screen, SelectionKind, Verdict};
use actiongate::modes::Mode;

/// actiongate — check which commands of the modal SQL client are legal
///
/// Evaluates the action table against a described UI state, lists the table,
/// and shows the saved connections that feed the session flags.
#[derive(Parser, Debug)]
#[command(name = "actiongate", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/actiongate/config.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging (repeat for trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide whether an action is allowed in the described state
    Check(CheckArgs),
    /// Print the action table
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print saved connections with their (masked) targets
    Connections,
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Action name, e.g. edit_connection
    action: String,

    /// Current mode: normal, insert, visual, leader_pending, command
    #[arg(short = 'm', long, default_value = "normal")]
    mode: String,

    /// Focused surface: tree, query_editor, results_table, none
    #[arg(short = 'f', long, default_value = "none")]
    focus: String,

    /// Explorer cursor node as KIND[:PAYLOAD], e.g. connection:prod
    #[arg(short = 's', long)]
    selection: Option<String>,

    /// Push an overlay onto the screen stack (repeatable, last one is on top)
    #[arg(long = "screen", value_name = "ID")]
    screens: Vec<String>,

    /// A connection is open
    #[arg(long)]
    connected: bool,

    /// A connection config is selected
    #[arg(long = "config-bound")]
    config_bound: bool,

    /// Explain a denial
    #[arg(short = 'e', long)]
    explain: bool,

    /// Emit the verdict and the captured context as JSON
    #[arg(long)]
    json: bool,
}

/// `check --json` output.
#[derive(Serialize)]
struct CheckReport<'a> {
    action: &'a str,
    allowed: bool,
    known: bool,
    unmet: Vec<String>,
    context: &'a ActionContext,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };

    match cli.command {
        Command::Check(args) => {
            let gate = config.build_gate().context("failed to build action table")?;
            run_check(&gate, &args)
        }
        Command::List { json } => {
            let gate = config.build_gate().context("failed to build action table")?;
            print_table(&gate, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Connections => {
            print_connections(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn snapshot_from_args(args: &CheckArgs) -> Result<HostSnapshot> {
    let mode =
        Mode::from_str_name(&args.mode).ok_or_else(|| anyhow!("unknown mode: {}", args.mode))?;
    let focus = FocusTarget::from_str_name(&args.focus)
        .ok_or_else(|| anyhow!("unknown focus target: {}", args.focus))?;

    // Unknown kinds are passed through; the gate normalizes them to none.
    let tree_cursor = args.selection.as_deref().map(|sel| match sel.split_once(':') {
        Some((kind, payload)) => (kind.to_string(), Some(payload.to_string())),
        None => (sel.to_string(), None),
    });
    if let Some((kind, _)) = &tree_cursor {
        if SelectionKind::from_str_name(kind).is_none() {
            log::warn!("unrecognized selection kind '{kind}', treating as none");
        }
    }

    if let Some(id) = args.screens.iter().find(|id| !Screen::is_valid_overlay_id(id)) {
        return Err(anyhow!("invalid overlay id: '{id}'"));
    }

    Ok(HostSnapshot {
        mode,
        tree_focused: focus == FocusTarget::Tree,
        query_focused: focus == FocusTarget::QueryEditor,
        results_focused: focus == FocusTarget::ResultsTable,
        tree_cursor,
        screen_stack: args.screens.clone(),
        has_current_connection: args.connected,
        has_current_config: args.config_bound,
    })
}

fn run_check(gate: &ActionGate, args: &CheckArgs) -> Result<ExitCode> {
    let snapshot = snapshot_from_args(args)?;
    let ctx = ActionContext::capture(&snapshot);

    let verdict = gate.verdict(&ctx, &args.action);
    if args.json {
        let report = CheckReport {
            action: &args.action,
            allowed: verdict.is_allowed(),
            known: verdict != Verdict::Unknown,
            unmet: match &verdict {
                Verdict::Denied(failing) => failing.iter().map(|g| g.to_string()).collect(),
                _ => Vec::new(),
            },
            context: &ctx,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_code(verdict.is_allowed()));
    }

    if verdict.is_allowed() {
        println!("{}", style("allow").green().bold());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", style("deny").red().bold());
    if args.explain {
        match verdict {
            Verdict::Unknown => println!("  unknown action '{}'", args.action),
            Verdict::Denied(failing) => {
                for guard in failing {
                    println!("  {} {guard}", style("unmet:").yellow());
                }
            }
            Verdict::Allowed => {}
        }
    }
    Ok(ExitCode::from(1))
}

fn exit_code(allowed: bool) -> ExitCode {
    if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn print_table(gate: &ActionGate, as_json: bool) -> Result<()> {
    let entries = gate.registry().entries();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        println!(
            "{}  {}",
            style(format!("{:<width$}", entry.name)).cyan().bold(),
            entry.predicate
        );
        println!("{:<width$}  {}", "", style(&entry.description).dim());
    }
    Ok(())
}

fn print_connections(config: &AppConfig) {
    if config.connections.is_empty() {
        println!("no saved connections");
        return;
    }
    for conn in &config.connections {
        let provider = actiongate::connections::get_provider(&conn.db_type)
            .map(|p| p.display_name)
            .unwrap_or("unknown provider");
        println!(
            "{}  {}  {}",
            style(&conn.name).cyan().bold(),
            style(provider).dim(),
            conn.display_target()
        );
    }
}
