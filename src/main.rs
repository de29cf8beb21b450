use anyhow::{anyhow, bail, Context};
use chrono::{TimeZone, Utc};
use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Password};
use gitorbit::{
    features::{
        chat, collaborators, commits, editor, notes, publish, repository, settings, transcripts,
        visualize,
    },
    health::{HealthService, SnapshotSource},
    llm::{flows, PromptMessage},
    logging, Config, CopilotError, GitHubClient, LlmClient, Workspace,
};
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::process;

mod cli;
use cli::{
    print_error, print_info, print_section, print_warning, spinner, Cli, CodeCommand,
    CollaboratorsCommand, Command, DataCommand, NotesCommand, ProjectCommand, TokenCommand,
    TranscriptsCommand,
};

/// Everything a command may need, built once per invocation
struct App {
    config: Config,
    workspace: Workspace,
}

impl App {
    fn open() -> anyhow::Result<Self> {
        let config = Config::load()?;
        config.validate()?;
        config.ensure_directories_exist()?;
        let workspace = Workspace::open(&config)
            .with_context(|| format!("opening data in {}", config.storage.data_dir.display()))?;
        Ok(Self { config, workspace })
    }

    fn github(&self) -> anyhow::Result<GitHubClient> {
        let token = self.workspace.effective_token(&self.config);
        Ok(GitHubClient::new(&self.config.github, token)?)
    }

    fn model(&self) -> anyhow::Result<LlmClient> {
        Ok(LlmClient::new(&self.config.llm)?)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    if let Err(e) = run(cli.command).await {
        print_error(&format!("Error: {:#}", e));
        if e
            .downcast_ref::<CopilotError>()
            .map_or(false, CopilotError::is_user_actionable)
        {
            print_warning("Tip: add a GitHub token with `gitorbit token set` to raise the rate limit and reach private repositories.");
        }
        process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let mut app = App::open()?;
    debug!("Using data directory {}", app.config.storage.data_dir.display());

    match command {
        Command::Load { url } => load(&mut app, &url).await,
        Command::Status => status(&app),
        Command::History { load: None } => {
            let history = app.workspace.history();
            if history.is_empty() {
                print_warning("No repositories loaded yet.");
            }
            for (i, reference) in history.iter().enumerate() {
                println!("{:>2}. {} {}", i + 1, reference.full_name().bold(), reference.url.dimmed());
            }
            Ok(())
        }
        Command::History { load: Some(position) } => {
            let reference = position
                .checked_sub(1)
                .and_then(|i| app.workspace.history().into_iter().nth(i))
                .ok_or_else(|| anyhow!("No history entry at position {}", position))?;
            load(&mut app, &reference.url).await
        }
        Command::Chat(args) => {
            if args.clear {
                chat::clear(&mut app.workspace)?;
                print_info("Chat history cleared.");
                return Ok(());
            }
            if args.question.is_empty() {
                for message in app.workspace.chat_messages() {
                    println!("{} {}\n", format!("{}:", message.role).bold(), message.content);
                }
                return Ok(());
            }
            let model = app.model()?;
            let pb = spinner("Thinking...");
            let reply = chat::ask(
                &mut app.workspace,
                &model,
                &app.config.limits,
                &args.question.join(" "),
            )
            .await;
            pb.finish_and_clear();
            println!("{}", reply?.content);
            Ok(())
        }
        Command::Commits { refresh } => {
            let list = if refresh || app.workspace.commits().is_empty() {
                let github = app.github()?;
                let pb = spinner("Fetching commits...");
                let list = commits::refresh(&mut app.workspace, &github, &app.config.limits).await;
                pb.finish_and_clear();
                list?
            } else {
                app.workspace.require_repo()?;
                app.workspace.commits()
            };
            for commit in list {
                let short: String = commit.sha().chars().take(7).collect();
                println!(
                    "{} {} {} {}",
                    short.yellow(),
                    commit.subject(),
                    format!("({})", commit.author_name()).dimmed(),
                    commit.date().dimmed()
                );
            }
            Ok(())
        }
        Command::ExplainCommit { sha, force } => {
            let sha = commits::resolve_sha(&app.workspace, &sha).unwrap_or(sha);
            let github = app.github()?;
            let model = app.model()?;
            let pb = spinner("Explaining commit...");
            let explanation = commits::explain(
                &mut app.workspace,
                &github,
                &model,
                &app.config.limits,
                &sha,
                force,
            )
            .await;
            pb.finish_and_clear();
            print_section(&format!("Commit {}", sha), &explanation?);
            Ok(())
        }
        Command::Visualize => {
            println!("{}", visualize::graph(&app.workspace)?);
            Ok(())
        }
        Command::Note { regenerate } => {
            let existing = app.workspace.generated_note();
            if !regenerate && !existing.is_empty() {
                println!("{}", existing);
                return Ok(());
            }
            let model = app.model()?;
            let pb = spinner("Writing repository note...");
            let note = notes::generate(&mut app.workspace, &model).await;
            pb.finish_and_clear();
            println!("{}", note?);
            Ok(())
        }
        Command::Notes(cmd) => run_notes(&mut app, cmd),
        Command::Transcripts(cmd) => run_transcripts(&mut app, cmd).await,
        Command::Health { range, force } => {
            let reference = app.workspace.require_repo()?;
            let github = app.github()?;
            let model = app.model()?;
            let service = HealthService::new(
                &github,
                &model,
                app.config.limits.health_ttl(),
                app.config.limits.token_ceiling,
            );
            let pb = spinner("Collecting repository statistics...");
            let outcome = service
                .snapshot(&mut app.workspace, &reference, range.days(), force)
                .await;
            pb.finish_and_clear();
            let (snapshot, source) = outcome?;

            let metrics = &snapshot.value.metrics;
            let when = Utc
                .timestamp_millis_opt(snapshot.timestamp)
                .single()
                .map(|t| t.to_rfc2822())
                .unwrap_or_default();
            println!(
                "{} over the last {} days {}",
                reference.full_name().bold(),
                range.days(),
                match source {
                    SnapshotSource::Cache => format!("(cached {})", when).dimmed(),
                    SnapshotSource::Fresh => "(fresh)".dimmed(),
                }
            );
            println!(
                "Commits in the last {} weeks: {}",
                metrics.commit_activity.len(),
                metrics.commit_activity.iter().map(|w| w.total).sum::<u64>()
            );
            println!("Issues: {} open, {} closed", metrics.issues.open, metrics.issues.closed);
            println!("Pull requests: {} open, {} closed", metrics.pulls.open, metrics.pulls.closed);
            for contributor in &metrics.contributors {
                println!("  {:<20} {}", contributor.author.login, contributor.total);
            }
            print_section("Insights", &snapshot.value.insights);
            Ok(())
        }
        Command::Code(cmd) => run_code(&mut app, cmd).await,
        Command::Project(cmd) => run_project(&mut app, cmd).await,
        Command::Collaborators(cmd) => run_collaborators(&app, cmd).await,
        Command::Ask { question } => {
            let model = LlmClient::new(&app.config.assistant)?;
            let messages = [PromptMessage::user(question.join(" "))];
            let pb = spinner("Thinking...");
            let answer =
                flows::ask_assistant(&model, &messages, app.config.limits.assistant_history).await;
            pb.finish_and_clear();
            println!("{}", answer?);
            Ok(())
        }
        Command::Token(TokenCommand::Set { value }) => {
            let token = match value {
                Some(value) => value,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("GitHub personal access token")
                    .interact()?,
            };
            settings::set_token(&mut app.workspace, token.trim())?;
            print_info("Token saved.");
            Ok(())
        }
        Command::Token(TokenCommand::Clear) => {
            if settings::clear_token(&mut app.workspace)? {
                print_info("Token removed.");
            } else {
                print_warning("No token was saved.");
            }
            Ok(())
        }
        Command::Data(cmd) => run_data(&mut app, cmd),
    }
}

async fn load(app: &mut App, url: &str) -> anyhow::Result<()> {
    let github = app.github()?;
    let pb = spinner(&format!("Loading {}...", url));
    let outcome = repository::load(&mut app.workspace, &github, &app.config.limits, url).await;
    pb.finish_and_clear();
    let ingested = outcome?;

    print_info(&format!(
        "Loaded {} ({} files, {} commits)",
        ingested.reference.full_name(),
        ingested.files.len(),
        ingested.commits.len()
    ));
    if ingested.truncated {
        print_warning("GitHub truncated the file tree; some files are missing.");
    }
    println!("Next: ask about it with {}", "gitorbit chat \"<question>\"".cyan());
    Ok(())
}

fn status(app: &App) -> anyhow::Result<()> {
    match app.workspace.loaded_repo() {
        Some(reference) => {
            println!("{} {}", reference.full_name().bold(), reference.url.dimmed());
            println!("Default branch: {}", reference.default_branch);
            println!("Files: {}", app.workspace.files().len());
            println!("Commits: {}", app.workspace.commits().len());
            println!("Chat messages: {}", app.workspace.chat_messages().len());
        }
        None => print_warning("No repository loaded. Run `gitorbit load <url>` first."),
    }
    let store = app.workspace.store();
    println!(
        "Storage: {} of {} bytes used ({})",
        store.used_bytes(),
        store.quota(),
        store.path().display()
    );
    let token = if app.workspace.effective_token(&app.config).is_some() {
        "configured".green()
    } else {
        "not set".yellow()
    };
    println!("GitHub token: {}", token);
    Ok(())
}

fn run_notes(app: &mut App, cmd: NotesCommand) -> anyhow::Result<()> {
    match cmd {
        NotesCommand::Add { title, content, tags } => {
            let note = notes::add(&mut app.workspace, &title, &content, &tags)?;
            print_info(&format!("Saved note {}", note.id));
        }
        NotesCommand::List => {
            let all = notes::list(&app.workspace);
            if all.is_empty() {
                print_warning("No notes yet.");
            }
            for note in all {
                let tags = if note.tags.is_empty() {
                    String::new()
                } else {
                    format!("[{}]", note.tags.join(", "))
                };
                println!("{} {} {}", note.title.bold(), tags.cyan(), note.id.dimmed());
                println!("{}\n", note.content);
            }
        }
        NotesCommand::Delete { id } => {
            if !notes::delete(&mut app.workspace, &id)? {
                bail!("No note with id {}", id);
            }
            print_info("Note deleted.");
        }
    }
    Ok(())
}

async fn run_transcripts(app: &mut App, cmd: TranscriptsCommand) -> anyhow::Result<()> {
    match cmd {
        TranscriptsCommand::Summarize { file } => {
            let content = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let model = app.model()?;
            let pb = spinner("Summarising transcript...");
            let transcript = transcripts::summarize(&mut app.workspace, &model, &content).await;
            pb.finish_and_clear();
            let transcript = transcript?;
            print_section("Summary", &transcript.summary);
            print_section("Action items", &transcript.action_items);
        }
        TranscriptsCommand::List => {
            for transcript in transcripts::list(&app.workspace) {
                println!("{}", transcript.id.dimmed());
                println!("{}\n", transcript.summary);
            }
        }
        TranscriptsCommand::Delete { id } => {
            if !transcripts::delete(&mut app.workspace, &id)? {
                bail!("No transcript with id {}", id);
            }
            print_info("Transcript deleted.");
        }
    }
    Ok(())
}

async fn run_code(app: &mut App, cmd: CodeCommand) -> anyhow::Result<()> {
    let model = app.model()?;
    match cmd {
        CodeCommand::Explain { path, question } => {
            let pb = spinner("Explaining code...");
            let explanation =
                editor::explain(&app.workspace, &model, &path, question.as_deref()).await;
            pb.finish_and_clear();
            println!("{}", explanation?);
        }
        CodeCommand::Edit { path, instruction, apply } => {
            let pb = spinner("Editing code...");
            let edited = editor::edit(&app.workspace, &model, &path, &instruction).await;
            pb.finish_and_clear();
            let edited = edited?;
            println!("{}", edited.edited_code);
            if apply {
                editor::apply(&mut app.workspace, &path, &edited.edited_code)?;
                print_info(&format!("Updated {} in the loaded files.", path));
            }
        }
    }
    Ok(())
}

async fn run_project(app: &mut App, cmd: ProjectCommand) -> anyhow::Result<()> {
    match cmd {
        ProjectCommand::Generate { name, prompt } => {
            let model = app.model()?;
            let pb = spinner("Generating project...");
            let project =
                publish::generate(&mut app.workspace, &model, &prompt.join(" "), &name).await;
            pb.finish_and_clear();
            let project = project?;
            for file in &project.files {
                println!("  {}", file.path);
            }
            print_info(&format!(
                "Staged {} files. Publish with `gitorbit project push`.",
                project.files.len()
            ));
        }
        ProjectCommand::Stage { dir } => {
            let project = publish::stage_directory(&mut app.workspace, &dir)?;
            print_info(&format!("Staged {} files as {}.", project.files.len(), project.name));
        }
        ProjectCommand::Show => match app.workspace.local_project() {
            Some(project) => {
                println!("{}", project.name.bold());
                for file in project.files {
                    println!("  {} {}", file.path, file.encoding.as_str().dimmed());
                }
            }
            None => print_warning("No project staged."),
        },
        ProjectCommand::Push { description, private } => {
            let github = app.github()?;
            let pb = spinner("Creating repository...");
            let url = publish::publish_staged(
                &mut app.workspace,
                &github,
                description.as_deref(),
                private,
            )
            .await;
            pb.finish_and_clear();
            print_info(&format!("Published to {}", url?));
        }
    }
    Ok(())
}

async fn run_collaborators(app: &App, cmd: CollaboratorsCommand) -> anyhow::Result<()> {
    let github = app.github()?;
    match cmd {
        CollaboratorsCommand::List => {
            for collaborator in collaborators::list(&app.workspace, &github).await? {
                println!(
                    "{} {}",
                    collaborator.login.bold(),
                    collaborator.role_name.unwrap_or_default().dimmed()
                );
            }
        }
        CollaboratorsCommand::Add { username } => {
            collaborators::add(&app.workspace, &github, &username).await?;
            print_info(&format!("Invited {}.", username));
        }
        CollaboratorsCommand::Remove { username } => {
            collaborators::remove(&app.workspace, &github, &username).await?;
            print_info(&format!("Removed {}.", username));
        }
    }
    Ok(())
}

fn run_data(app: &mut App, cmd: DataCommand) -> anyhow::Result<()> {
    match cmd {
        DataCommand::Export { output: None } => println!("{}", settings::export(&app.workspace)?),
        DataCommand::Export { output: Some(path) } => {
            fs::write(&path, settings::export(&app.workspace)?)
                .with_context(|| format!("writing {}", path.display()))?;
            print_info(&format!("Backup written to {}", path.display()));
        }
        DataCommand::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let written = settings::import(&mut app.workspace, &json)?;
            print_info(&format!("Imported {} keys.", written));
        }
        DataCommand::Erase { yes } => {
            let confirmed = yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Delete all GitOrbit data?")
                    .default(false)
                    .interact()?;
            if !confirmed {
                print_warning("Nothing erased.");
                return Ok(());
            }
            let removed = settings::erase(&mut app.workspace)?;
            print_info(&format!("Erased {} keys.", removed));
        }
    }
    Ok(())
}
