//! CLI entry point for chords
//!
//! Manages the chord list in the settings file and replays keystroke
//! scripts against an in-memory editor.

use anyhow::{anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use chords::config::SettingsManager;
use chords::core::parser::{parse_script, ScriptStep};
use chords::core::validator::{validate_chord, validate_key};
use chords::core::{ChordDefinition, ChordKind, KeyEvent};
use chords::dispatch::host::{ActionRegistry, ContentStore, Editor, Host};
use chords::dispatch::memory::{
    MemoryActions, MemoryContentStore, MemoryEditor, RecordingNotifier, SharedEditor, VaultStore,
};
use chords::dispatch::suggest::{suggest_commands, suggest_files};
use chords::dispatch::templates::PlaceholderTemplates;
use chords::dispatch::{ChordOutcome, Dispatcher};
use chords::engine::runtime::{run, EditorEvent, RunReport};
use chords::engine::{ChordEngine, ChordManager};
use chords::logging;

/// Extra time after a script ends so its last chord can fire
const SETTLE: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "chords")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, default_value = "~/.config/chords/settings.json")]
    settings: PathBuf,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all chords
    List {
        /// Only show chords whose key, value or kind contains this
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Check for duplicate keys and invalid chords
    Check {
        #[command(flatten)]
        host: HostArgs,
    },

    /// Add a chord
    Add {
        key: String,
        value: String,

        #[arg(short, long, default_value = "text")]
        kind: ChordKind,
    },

    /// Remove the chord at a position (as shown by `list`)
    Remove { position: usize },

    /// Change a chord's key, value or kind
    Edit {
        position: usize,

        #[arg(long)]
        key: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        kind: Option<ChordKind>,
    },

    /// Move a chord up or down the list
    Move {
        position: usize,
        direction: Direction,
    },

    /// Show or change the recognition delay
    Delay {
        /// Delay in milliseconds
        #[arg(long, conflicts_with_all = ["wpm", "manual", "auto"])]
        ms: Option<f64>,

        /// Derive the delay from a typing speed in words per minute
        #[arg(long, conflicts_with_all = ["ms", "manual", "auto"])]
        wpm: Option<f64>,

        /// Mark the delay as set by hand
        #[arg(long, conflicts_with_all = ["ms", "wpm", "auto"])]
        manual: bool,

        /// Mark the delay as derived from typing speed
        #[arg(long, conflicts_with_all = ["ms", "wpm", "manual"])]
        auto: bool,
    },

    /// Turn the "Chord Executed" notice for a kind on or off
    Notice { kind: ChordKind, state: Switch },

    /// Replay a keystroke script, e.g. "ab<wait 100>" or "x<Shift>y"
    Simulate {
        script: String,

        /// Text already in the document; the cursor starts at its end
        #[arg(long, default_value = "")]
        text: String,

        #[command(flatten)]
        templates: TemplateArgs,

        #[command(flatten)]
        host: HostArgs,
    },

    /// Suggest command names or file paths for a chord value
    Suggest {
        source: Source,
        query: String,

        #[command(flatten)]
        host: HostArgs,
    },
}

/// Collaborators available to Command, File and Template chords
#[derive(Args)]
struct HostArgs {
    /// Directory that File and Template chords read from
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Name of a host command (repeatable)
    #[arg(long = "action", value_name = "NAME")]
    actions: Vec<String>,
}

/// Built-in template collaborator for `simulate`
#[derive(Args)]
struct TemplateArgs {
    /// Enable the built-in {{date}} / {{time}} / {{title}} templates
    #[arg(long)]
    templates: bool,

    /// strftime format for {{date}}
    #[arg(long, requires = "templates", value_name = "FORMAT")]
    date_format: Option<String>,

    /// strftime format for {{time}}
    #[arg(long, requires = "templates", value_name = "FORMAT")]
    time_format: Option<String>,
}

impl TemplateArgs {
    fn expander(&self) -> Option<PlaceholderTemplates> {
        if !self.templates {
            return None;
        }

        let mut templates = PlaceholderTemplates::new();
        if let Some(format) = &self.date_format {
            templates = templates.with_date_format(format.as_str());
        }
        if let Some(format) = &self.time_format {
            templates = templates.with_time_format(format.as_str());
        }
        Some(templates)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    Files,
    Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings_path = expand_path(&cli.settings)?;

    match cli.command {
        Commands::List { filter } => list_chords(&settings_path, filter.as_deref())?,
        Commands::Check { host } => check_chords(&settings_path, &host)?,
        Commands::Add { key, value, kind } => add_chord(&settings_path, key, value, kind)?,
        Commands::Remove { position } => {
            let mut manager = open_manager(&settings_path)?;
            let removed = manager.remove_chord(index(position)?)?;
            println!("{} Removed {}", "✓".green(), removed);
        }
        Commands::Edit {
            position,
            key,
            value,
            kind,
        } => edit_chord(&settings_path, position, key, value, kind)?,
        Commands::Move {
            position,
            direction,
        } => {
            let mut manager = open_manager(&settings_path)?;
            let at = index(position)?;
            match direction {
                Direction::Up => manager.move_up(at)?,
                Direction::Down => manager.move_down(at)?,
            }
            println!("{} Moved chord {}", "✓".green(), position);
        }
        Commands::Delay {
            ms,
            wpm,
            manual,
            auto,
        } => set_delay(&settings_path, ms, wpm, manual, auto)?,
        Commands::Notice { kind, state } => {
            let mut manager = open_manager(&settings_path)?;
            let on = matches!(state, Switch::On);
            manager.set_notice(kind, on)?;
            println!(
                "{} {} Chord Executed notice {}",
                "✓".green(),
                kind,
                if on { "on".green() } else { "off".yellow() }
            );
        }
        Commands::Simulate {
            script,
            text,
            templates,
            host,
        } => simulate(&settings_path, &script, &text, &templates, &host)?,
        Commands::Suggest {
            source,
            query,
            host,
        } => suggest(source, &query, &host)?,
    }

    Ok(())
}

/// Expands a leading `~` in a path argument
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Converts a 1-based position from the command line
fn index(position: usize) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Positions start at 1"))
}

fn open_manager(settings_path: &Path) -> anyhow::Result<ChordManager> {
    let files = SettingsManager::new(settings_path.to_path_buf())?;
    let settings = files.load()?;
    Ok(ChordManager::new(settings, Box::new(files)))
}

fn build_host(args: &HostArgs, notifier: Arc<RecordingNotifier>) -> anyhow::Result<Host> {
    let content: Arc<dyn ContentStore> = match &args.vault {
        Some(vault) => Arc::new(VaultStore::new(expand_path(vault)?)),
        None => Arc::new(MemoryContentStore::new()),
    };
    Ok(Host::new(
        Arc::new(MemoryActions::from_names(&args.actions)),
        content,
        notifier,
    ))
}

fn kind_label(kind: ChordKind) -> ColoredString {
    match kind {
        ChordKind::Text => kind.to_string().blue(),
        ChordKind::Command => kind.to_string().magenta(),
        ChordKind::Template => kind.to_string().cyan(),
        ChordKind::File => kind.to_string().green(),
    }
}

/// List chords in display order
fn list_chords(settings_path: &Path, filter: Option<&str>) -> anyhow::Result<()> {
    let manager = open_manager(settings_path)?;
    let settings = manager.settings();

    println!("{}", format!("Chords from: {}\n", settings_path.display()).bold());

    let shown = manager.filter(filter.unwrap_or(""));
    for (position, chord) in &shown {
        let key = if chord.key.is_empty() {
            "(no key)".dimmed()
        } else {
            chord.key.cyan().bold()
        };
        let note = if manager.is_duplicate(*position) && !manager.registry().is_active(*position) {
            " (shadowed)".yellow()
        } else {
            "".normal()
        };

        println!(
            "{} {} [{}] → {}{}",
            format!("{}.", position + 1).dimmed(),
            key,
            kind_label(chord.kind),
            chord.value,
            note
        );
    }

    println!(
        "\n{} Total: {} of {} chords, delay {:.1} ms ({:.0} WPM{})",
        "✓".green(),
        shown.len(),
        manager.registry().len(),
        settings.delay,
        settings.wpm(),
        if settings.set_delay_manually { ", set manually" } else { "" }
    );

    Ok(())
}

/// Report duplicate keys and chords that cannot run
fn check_chords(settings_path: &Path, args: &HostArgs) -> anyhow::Result<()> {
    let manager = open_manager(settings_path)?;
    let host = build_host(args, Arc::new(RecordingNotifier::new()))?;

    let actions: Option<&dyn ActionRegistry> =
        (!args.actions.is_empty()).then(|| host.actions.as_ref());
    let content: Option<&dyn ContentStore> = args.vault.is_some().then(|| host.content.as_ref());

    println!(
        "{} Checking {} chords in {}",
        "→".cyan(),
        manager.registry().len(),
        settings_path.display()
    );

    let mut invalid = 0;
    for (position, chord) in manager.registry().iter().enumerate() {
        if let Err(e) = validate_chord(chord, actions, content) {
            invalid += 1;
            println!(
                "{} {} {}: {}",
                "⚠".yellow(),
                format!("{}.", position + 1).dimmed(),
                chord,
                e
            );
        }
    }

    let conflicts = manager.conflicts();
    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No duplicate chords!".bold());
    } else {
        println!(
            "{} Found {} duplicate key{}:\n",
            "✗".red().bold(),
            conflicts.len(),
            if conflicts.len() == 1 { "" } else { "s" }
        );

        for conflict in &conflicts {
            println!("{}", conflict.key.as_str().yellow().bold());
            for &position in &conflict.positions {
                let marker = if conflict.active == Some(position) {
                    "active".green()
                } else {
                    "shadowed".dimmed()
                };
                if let Some(chord) = manager.registry().get(position) {
                    println!(
                        "  {} {} ({})",
                        format!("{}.", position + 1).dimmed(),
                        chord,
                        marker
                    );
                }
            }
            println!();
        }
    }

    if invalid > 0 {
        println!("{} {} chord(s) cannot run", "⚠".yellow(), invalid);
    }

    if !conflicts.is_empty() {
        println!("{}", "⚠ Only the first chord of each key will fire!".yellow());
        std::process::exit(1);
    }

    Ok(())
}

fn add_chord(
    settings_path: &Path,
    key: String,
    value: String,
    kind: ChordKind,
) -> anyhow::Result<()> {
    validate_key(&key)?;

    let mut manager = open_manager(settings_path)?;
    let position = manager.add_chord(ChordDefinition::new(key, value, kind))?;

    if manager.registry().is_active(position) {
        println!("{} Added chord {}", "✓".green(), position + 1);
    } else {
        println!(
            "{} Added chord {}, but an earlier chord already uses this key",
            "⚠".yellow(),
            position + 1
        );
    }
    Ok(())
}

fn edit_chord(
    settings_path: &Path,
    position: usize,
    key: Option<String>,
    value: Option<String>,
    kind: Option<ChordKind>,
) -> anyhow::Result<()> {
    if key.is_none() && value.is_none() && kind.is_none() {
        bail!("Nothing to change: pass --key, --value or --kind");
    }

    let mut manager = open_manager(settings_path)?;
    let at = index(position)?;

    if let Some(kind) = kind {
        manager.update_kind(at, kind)?;
    }
    if let Some(value) = value {
        manager.update_value(at, &value)?;
    }
    if let Some(key) = key {
        validate_key(&key)?;
        manager.update_key(at, &key)?;
    }

    if let Some(chord) = manager.registry().get(at) {
        println!("{} {}", "✓".green(), chord);
    }
    Ok(())
}

fn set_delay(
    settings_path: &Path,
    ms: Option<f64>,
    wpm: Option<f64>,
    manual: bool,
    auto: bool,
) -> anyhow::Result<()> {
    let mut manager = open_manager(settings_path)?;

    if let Some(ms) = ms {
        manager.set_delay_ms(ms)?;
    } else if let Some(wpm) = wpm {
        manager.set_wpm(wpm)?;
    } else if manual || auto {
        manager.set_delay_manually(manual)?;
    }

    let settings = manager.settings();
    println!(
        "{} Delay {:.1} ms ({:.0} WPM), {}",
        "✓".green(),
        settings.delay,
        settings.wpm(),
        if settings.set_delay_manually {
            "set manually"
        } else {
            "derived from typing speed"
        }
    );
    Ok(())
}

/// Replay a keystroke script through the chord runtime in real time
fn simulate(
    settings_path: &Path,
    script: &str,
    text: &str,
    templates: &TemplateArgs,
    args: &HostArgs,
) -> anyhow::Result<()> {
    let steps = parse_script(script)?;
    let manager = open_manager(settings_path)?;
    let delay = manager.state().delay();

    let notifier = Arc::new(RecordingNotifier::new());
    let mut host = build_host(args, notifier.clone())?;
    if let Some(templates) = templates.expander() {
        host = host.with_templates(Arc::new(templates));
    }

    let mut engine = ChordEngine::new(manager, Dispatcher::new(host));
    let editor = SharedEditor::new(MemoryEditor::new(text));

    println!(
        "{} Replaying {} steps (delay {:.1} ms)",
        "→".cyan(),
        steps.len(),
        delay.as_secs_f64() * 1000.0
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let report: RunReport = runtime.block_on(async {
        let (tx, rx) = mpsc::channel(64);
        let mut runtime_editor = editor.clone();

        let (typed, report) = tokio::join!(
            type_script(steps, editor.clone(), tx, delay),
            run(&mut engine, &mut runtime_editor, rx),
        );
        typed.map(|()| report)
    })?;

    for outcome in &report.outcomes {
        match outcome {
            Ok(ChordOutcome::TextInserted { cursor }) => {
                println!("{} Text inserted, cursor at {}", "✓".green(), cursor)
            }
            Ok(ChordOutcome::CommandInvoked { id }) => {
                println!("{} Invoked {}", "✓".green(), id.magenta())
            }
            Ok(ChordOutcome::ContentInserted { path, cursor }) => println!(
                "{} Inserted {}, cursor at {}",
                "✓".green(),
                path.cyan(),
                cursor
            ),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }

    for message in notifier.take() {
        println!("{} {}", "ℹ".blue(), message);
    }

    println!("\n{}", "Document:".bold());
    println!("{}", editor.snapshot().render_with_cursor());

    Ok(())
}

/// Types the script into the editor and forwards each key to the runtime
async fn type_script(
    steps: Vec<ScriptStep>,
    editor: SharedEditor,
    tx: mpsc::Sender<EditorEvent>,
    delay: Duration,
) -> anyhow::Result<()> {
    for step in steps {
        let event = match step {
            ScriptStep::Key(key) => {
                if let KeyEvent::Char(c) = &key {
                    editor.with(|doc| {
                        if doc.has_focus() {
                            doc.type_text(&c.to_string());
                        }
                    });
                }
                EditorEvent::Key(key)
            }
            ScriptStep::Wait(duration) => {
                tokio::time::sleep(duration).await;
                continue;
            }
            ScriptStep::Blur => {
                editor.with(|doc| doc.set_focus(false));
                EditorEvent::Focus(false)
            }
            ScriptStep::Focus => {
                editor.with(|doc| doc.set_focus(true));
                EditorEvent::Focus(true)
            }
        };

        tx.send(event)
            .await
            .map_err(|_| anyhow!("Chord runtime stopped early"))?;
    }

    tokio::time::sleep(delay + SETTLE).await;
    tx.send(EditorEvent::Shutdown)
        .await
        .map_err(|_| anyhow!("Chord runtime stopped early"))?;
    Ok(())
}

/// Suggest values for Command or File chords
fn suggest(source: Source, query: &str, args: &HostArgs) -> anyhow::Result<()> {
    let host = build_host(args, Arc::new(RecordingNotifier::new()))?;

    let suggestions: Vec<String> = match source {
        Source::Commands => suggest_commands(host.actions.as_ref(), query)
            .into_iter()
            .map(|action| action.name)
            .collect(),
        Source::Files => {
            if args.vault.is_none() {
                bail!("File suggestions need --vault");
            }
            suggest_files(host.content.as_ref(), query)
        }
    };

    if suggestions.is_empty() {
        println!("{} No matches for '{}'", "✗".yellow(), query);
    }
    for suggestion in suggestions {
        println!("{}", suggestion);
    }

    Ok(())
}
