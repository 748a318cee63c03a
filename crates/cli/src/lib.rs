use anyhow::{Context, Result};
use chatfold_search::sort_entries;
use chatfold_session::{
    CommandOutcome, JsonFileStore, Session, SessionError, TreeCommand, ViewState,
};
use chatfold_tree::{NodeType, TreeError, TreeStore};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use render::{result_views, results_text, stats_text, tree_text, TreeView};
use response::Response;
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

mod config;
mod render;
mod response;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json(response: &Response) -> Result<()> {
    let mut text = serde_json::to_string_pretty(response)?;
    text.push('\n');
    print_stdout(&text)
}

#[derive(Parser)]
#[command(name = "chatfold")]
#[command(about = "Organize saved chat links into folders", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file, JSON or TOML (default: ./chatfold.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tree data file (overrides CHATFOLD_DATA and the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print a JSON response instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tree, folders first
    Tree(TreeArgs),

    /// Create a folder
    #[command(name = "add-folder")]
    AddFolder(AddFolderArgs),

    /// Save a chat link
    #[command(name = "add-chat")]
    AddChat(AddChatArgs),

    /// Change a chat's name, link or tag
    #[command(name = "edit-chat")]
    EditChat(EditChatArgs),

    /// Rename a folder or chat
    Rename {
        id: String,
        name: String,
    },

    /// Delete a node; chats inside a deleted folder move to its parent
    Delete {
        id: String,
    },

    /// Move a node into a folder (or into the folder holding a chat)
    Move {
        source: String,
        target: String,
    },

    /// Expand or collapse a folder
    Toggle {
        id: String,
    },

    /// Expand every folder
    #[command(name = "expand-all")]
    ExpandAll,

    /// Collapse every folder
    #[command(name = "collapse-all")]
    CollapseAll,

    /// Expand every folder above a node
    Reveal {
        id: String,
    },

    /// Count chats under a folder
    Count {
        #[arg(default_value = "root")]
        id: String,
    },

    /// Search chats by name or tag
    Search(SearchArgs),

    /// Show tree totals
    Stats,

    /// Drop everything and start from an empty root
    Reset,

    /// Execute a JSON tree command: {"action": "...", "payload": {...}}
    Command(CommandArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Subtree to show (defaults to the root)
    #[arg(long)]
    id: Option<String>,

    /// Show children of collapsed folders too
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct AddFolderArgs {
    name: String,

    /// Parent folder id
    #[arg(long, default_value = "root")]
    parent: String,
}

#[derive(Args)]
struct AddChatArgs {
    name: String,

    link: String,

    /// Parent folder id
    #[arg(long, default_value = "root")]
    parent: String,

    #[arg(long)]
    tag: Option<String>,
}

#[derive(Args)]
struct EditChatArgs {
    id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    link: Option<String>,

    /// New tag; pass an empty string to remove it
    #[arg(long)]
    tag: Option<String>,
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    /// Sort results by name instead of tree order
    #[arg(long)]
    sort: bool,
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request (reads stdin when neither this nor --file is given)
    #[arg(conflicts_with = "file")]
    request: Option<String>,

    /// Path to a file holding the JSON request
    #[arg(long)]
    file: Option<PathBuf>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let json = cli.json || matches!(cli.command, Commands::Command(_));
    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) if json => {
            print_json(&Response::error(&err))?;
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Failed to resolve working directory")?;
    let config = AppConfig::load(cli.config.as_deref(), &cwd)?;
    let data_path = config.data_path(cli.data.as_deref(), &cwd);
    log::debug!("Using data file {}", data_path.display());

    let mut session = Session::open(JsonFileStore::new(&data_path), config.tree, config.search)
        .await
        .with_context(|| format!("Failed to open {}", data_path.display()))?;
    let json = cli.json;

    let command = match cli.command {
        Commands::Tree(args) => return show_tree(&session, args, json),
        Commands::Count { id } => return show_count(&session, &id, json),
        Commands::Search(args) => return show_search(&mut session, args, json),
        Commands::Stats => return show_stats(&session, json),
        Commands::Command(args) => {
            let raw = read_request(&args)?;
            let command: TreeCommand =
                serde_json::from_str(&raw).context("Invalid JSON tree command")?;
            let outcome = session.apply(command).await?;
            return print_json(&Response::ok(outcome)?);
        }
        Commands::AddFolder(args) => TreeCommand::CreateFolder {
            parent_id: args.parent,
            name: args.name,
        },
        Commands::AddChat(args) => TreeCommand::CreateChat {
            parent_id: args.parent,
            name: args.name,
            link: args.link,
            tag: args.tag,
        },
        Commands::EditChat(args) => TreeCommand::UpdateChat {
            id: args.id,
            name: args.name,
            link: args.link,
            tag: args.tag,
        },
        Commands::Rename { id, name } => TreeCommand::Rename { id, name },
        Commands::Delete { id } => TreeCommand::Delete { id },
        Commands::Move { source, target } => TreeCommand::Move {
            source_id: source,
            target_id: target,
        },
        Commands::Toggle { id } => TreeCommand::Toggle { id },
        Commands::ExpandAll => TreeCommand::ExpandAll,
        Commands::CollapseAll => TreeCommand::CollapseAll,
        Commands::Reveal { id } => TreeCommand::Reveal { id },
        Commands::Reset => TreeCommand::Reset,
    };

    let outcome = session.apply(command).await?;
    if json {
        print_json(&Response::ok(&outcome)?)
    } else {
        print_stdout(&format!("{}\n", describe_outcome(&outcome, session.tree())))
    }
}

fn read_request(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.request {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read command from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read command from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Pass it inline, with --file, or on stdin.");
    }
    Ok(buffer)
}

fn lookup_error(id: &str) -> SessionError {
    SessionError::Tree(TreeError::not_found(id))
}

fn show_tree(session: &Session<JsonFileStore>, args: TreeArgs, json: bool) -> Result<()> {
    let tree = session.tree();
    let node = match &args.id {
        Some(id) => tree.find_by_id(id).ok_or_else(|| lookup_error(id))?,
        None => tree.root(),
    };

    if json {
        print_json(&Response::ok(TreeView::build(tree, node))?)
    } else {
        print_stdout(&tree_text(tree, node, args.all))
    }
}

#[derive(Serialize)]
struct CountOutput<'a> {
    id: &'a str,
    chats: usize,
}

fn show_count(session: &Session<JsonFileStore>, id: &str, json: bool) -> Result<()> {
    let tree = session.tree();
    let node = tree.find_by_id(id).ok_or_else(|| lookup_error(id))?;
    let chats = tree.count_chats(id);

    if json {
        print_json(&Response::ok(CountOutput { id, chats })?)
    } else {
        print_stdout(&format!("{}: {chats} chats\n", node.name))
    }
}

fn show_search(session: &mut Session<JsonFileStore>, args: SearchArgs, json: bool) -> Result<()> {
    match session.view(&args.query) {
        ViewState::Results { query, mut entries } => {
            if args.sort {
                sort_entries(&mut entries);
            }
            if json {
                print_json(&Response::ok(serde_json::json!({
                    "view": "results",
                    "query": query,
                    "results": result_views(&entries, &query),
                }))?)
            } else {
                print_stdout(&results_text(&entries, &query))
            }
        }
        ViewState::Tree { .. } => {
            log::info!("Query too short to search, showing the tree");
            let tree = session.tree();
            if json {
                print_json(&Response::ok(serde_json::json!({
                    "view": "tree",
                    "root": TreeView::build(tree, tree.root()),
                }))?)
            } else {
                print_stdout(&tree_text(tree, tree.root(), false))
            }
        }
    }
}

fn show_stats(session: &Session<JsonFileStore>, json: bool) -> Result<()> {
    let stats = session.tree().stats();
    if json {
        print_json(&Response::ok(stats)?)
    } else {
        print_stdout(&stats_text(&stats))
    }
}

fn describe_outcome(outcome: &CommandOutcome, tree: &TreeStore) -> String {
    match outcome {
        CommandOutcome::Created { node } => {
            let kind = match node.kind {
                NodeType::Folder => "folder",
                NodeType::Chat => "chat",
            };
            format!("Created {kind} \"{}\" [{}]", node.name, node.id)
        }
        CommandOutcome::Renamed { id } => format!("Renamed [{id}]"),
        CommandOutcome::Updated { id } => format!("Updated chat [{id}]"),
        CommandOutcome::Deleted { report } => match report.kind {
            NodeType::Chat => format!("Deleted chat \"{}\"", report.name),
            NodeType::Folder => format!(
                "Deleted folder \"{}\"; {} chats moved up, {} folders removed",
                report.name,
                report.relocated.len(),
                report.discarded_folders
            ),
        },
        CommandOutcome::Moved { id, parent_id } => {
            let parent = tree
                .find_by_id(parent_id.as_str())
                .map_or(parent_id.as_str(), |node| node.name.as_str());
            format!("Moved [{id}] into \"{parent}\"")
        }
        CommandOutcome::Toggled { id, expanded } => {
            let state = if *expanded { "expanded" } else { "collapsed" };
            format!("Folder [{id}] {state}")
        }
        CommandOutcome::Expansion { folders, expanded } => {
            let verb = if *expanded { "Expanded" } else { "Collapsed" };
            format!("{verb} {folders} folders")
        }
        CommandOutcome::Revealed { id, opened } => {
            format!("Revealed [{id}], opened {} folders", opened.len())
        }
        CommandOutcome::Reset => "Tree reset to an empty root".to_string(),
    }
}
