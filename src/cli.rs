use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Terminal co-pilot for GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "gitorbit", author, version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a public GitHub repository
    Load {
        /// Repository URL, e.g. https://github.com/octocat/Hello-World
        url: String,
    },
    /// Show the loaded repository
    Status,
    /// List recently loaded repositories
    History {
        /// Load the entry at this position again (1 is the most recent)
        #[arg(long)]
        load: Option<usize>,
    },
    /// Ask a question about the loaded repository
    Chat(ChatArgs),
    /// List recent commits of the loaded repository
    Commits {
        /// Fetch the list again from GitHub
        #[arg(long)]
        refresh: bool,
    },
    /// Explain what a commit changed
    ExplainCommit {
        /// Full or abbreviated SHA
        sha: String,
        /// Ignore a saved explanation
        #[arg(long)]
        force: bool,
    },
    /// Print the loaded file tree as a Mermaid graph
    Visualize,
    /// Show or generate the repository note
    Note {
        /// Generate a new note even if one exists
        #[arg(long)]
        regenerate: bool,
    },
    /// Manage personal notes
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Summarise meeting transcripts
    #[command(subcommand)]
    Transcripts(TranscriptsCommand),
    /// Show the health report of the loaded repository
    Health {
        /// Time range in days
        #[arg(long, value_enum, default_value_t = HealthRange::Month)]
        range: HealthRange,
        /// Ignore the cached report
        #[arg(long)]
        force: bool,
    },
    /// Explain or edit a loaded file
    #[command(subcommand)]
    Code(CodeCommand),
    /// Stage and publish a new repository
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage collaborators of the loaded repository
    #[command(subcommand)]
    Collaborators(CollaboratorsCommand),
    /// Ask the built-in assistant about GitOrbit
    Ask {
        /// Your question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Manage the GitHub personal access token
    #[command(subcommand)]
    Token(TokenCommand),
    /// Back up, restore or erase local data
    #[command(subcommand)]
    Data(DataCommand),
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Your question
    pub question: Vec<String>,
    /// Forget the chat history
    #[arg(long, conflicts_with = "question")]
    pub clear: bool,
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// Add a note
    Add {
        title: String,
        content: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// List notes, newest first
    List,
    /// Delete a note
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TranscriptsCommand {
    /// Summarise a transcript read from a file or stdin
    Summarize {
        /// Transcript file; stdin when omitted
        file: Option<PathBuf>,
    },
    /// List summarised transcripts
    List,
    /// Delete a transcript
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CodeCommand {
    /// Explain a loaded file
    Explain {
        /// Path inside the repository
        path: String,
        /// Specific question about the file
        #[arg(long)]
        question: Option<String>,
    },
    /// Propose an edit of a loaded file
    Edit {
        /// Path inside the repository
        path: String,
        /// What to change
        instruction: String,
        /// Store the edited content in place of the loaded file
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Generate a project from a description and stage it
    Generate {
        /// Repository name for the project
        name: String,
        /// What to build
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Stage the files of a local directory
    Stage { dir: PathBuf },
    /// Show the staged project
    Show,
    /// Create a repository from the staged project
    Push {
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        private: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CollaboratorsCommand {
    List,
    Add { username: String },
    Remove { username: String },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Save a token; prompts when no value is given
    Set {
        #[arg(long)]
        value: Option<String>,
    },
    /// Forget the saved token
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum DataCommand {
    /// Print or write a backup of every GitOrbit key
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a backup
    Import { file: PathBuf },
    /// Delete every GitOrbit key
    Erase {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Health report time ranges
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthRange {
    #[value(name = "30")]
    Month,
    #[value(name = "90")]
    Quarter,
    #[value(name = "365")]
    Year,
}

impl HealthRange {
    pub fn days(self) -> u32 {
        match self {
            HealthRange::Month => 30,
            HealthRange::Quarter => 90,
            HealthRange::Year => 365,
        }
    }
}

/// Spinner shown while waiting on the network
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn print_info(message: &str) {
    println!("{}", message.green());
}

pub fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

/// Prints a titled section
pub fn print_section(title: &str, body: &str) {
    println!("\n{}", title.bright_cyan().bold());
    println!("{}", body);
}
