use a2a_studio::parts::{data_summary, format_file_size};
use a2a_studio::{
    logging, ConversationPart, ErrorKind, FileSource, SessionInfo, Studio, StudioConfig, Turn,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Interactive client for A2A agents
#[derive(Debug, Parser)]
#[command(name = "a2a-studio", version, about)]
struct Args {
    /// YAML or JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Agent to connect to on startup
    #[arg(long)]
    url: Option<String>,

    /// Log filter, e.g. `debug` or `a2a_studio=trace`
    #[arg(long)]
    log: Option<String>,
}

const HELP: &str = "\
Commands:
  /connect <url>   connect to the agent published at <url>
  /disconnect      drop the current session
  /card            print the agent card as JSON
  /info            print the session summary and validation results
  /tasks           list open tasks (* marks the selected one)
  /select <id>     route the next messages to task <id>
  /task <id>       print the turns of task <id>
  /help            show this help
  /quit            exit
Anything else is sent to the agent.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StudioConfig::from_path(path)?,
        None => StudioConfig::default(),
    }
    .with_env_overrides();
    if let Some(url) = args.url {
        config.agent_url = Some(url);
    }
    if let Some(filter) = args.log {
        config.log_filter = filter;
    }

    logging::init_tracing(&config.log_filter);

    let mut studio = Studio::new(Arc::new(config.connector()?));
    if let Some(url) = &config.agent_url {
        connect(&mut studio, url).await;
    }

    println!("a2a-studio {} - type /help for commands", env!("CARGO_PKG_VERSION"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&studio).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/connect" if !arg.is_empty() => connect(&mut studio, arg).await,
            "/connect" => println!("usage: /connect <url>"),
            "/disconnect" => {
                studio.disconnect();
                println!("disconnected");
            }
            "/card" => match studio.agent_card_json() {
                Some(json) => println!("{json}"),
                None => println!("not connected"),
            },
            "/info" => match studio.current_agent() {
                Some(info) => print_info(info),
                None => println!("not connected"),
            },
            "/tasks" => print_tasks(&mut studio),
            "/select" if !arg.is_empty() => match studio.select_task(arg) {
                Ok(()) => println!("messages now go to task {arg}"),
                Err(e) => println!("{e}"),
            },
            "/select" => println!("usage: /select <task id>"),
            "/task" if !arg.is_empty() => {
                let turns = studio.task_turns(arg);
                if turns.is_empty() {
                    println!("no turns for task {arg}");
                }
                for turn in turns {
                    print_turn(turn);
                }
            }
            "/task" => println!("usage: /task <task id>"),
            _ if command.starts_with('/') => println!("unknown command {command}; try /help"),
            _ => {
                let failure = match studio.send(line).await {
                    Ok(turn) => {
                        print_turn(turn);
                        None
                    }
                    Err(e) => Some(e),
                };
                // Failed exchanges are already in the log as error turns.
                if let Some(e) = failure {
                    match studio.turns().last() {
                        Some(turn) if turn.is_error && e.kind() != ErrorKind::Input => {
                            print_turn(turn)
                        }
                        _ => println!("{e}"),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn prompt(studio: &Studio) -> std::io::Result<()> {
    let label = match (studio.current_agent(), studio.selected_task()) {
        (Some(info), Some(task)) => format!("{} [{}]> ", info.name, task),
        (Some(info), None) => format!("{}> ", info.name),
        (None, _) => "> ".to_string(),
    };
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await
}

async fn connect(studio: &mut Studio, url: &str) {
    match studio.connect(url).await {
        Ok(info) => {
            println!("connected to {} {} at {}", info.name, info.version, info.url);
            if !info.validation.is_valid() {
                println!(
                    "card has {} validation error(s); /info for details",
                    info.validation.errors.len()
                );
            }
        }
        Err(e) => println!("{e}"),
    }
}

fn print_info(info: &SessionInfo) {
    println!("name:         {}", info.name);
    println!("description:  {}", info.description);
    println!("version:      {}", info.version);
    println!("url:          {}", info.url);
    println!("capabilities: {}", info.capabilities.join(", "));
    println!("updated:      {}", info.last_updated.to_rfc3339());
    for skill in &info.skills {
        println!("skill:        {} - {}", skill.name, skill.description);
    }
    for error in &info.validation.errors {
        println!("error:        {error}");
    }
    for warning in &info.validation.warnings {
        println!("warning:      {warning}");
    }
}

fn print_tasks(studio: &mut Studio) {
    let tasks = studio.available_tasks();
    if tasks.is_empty() {
        println!("no open tasks");
        return;
    }
    let selected = studio.selected_task().map(str::to_string);
    for task in tasks {
        let marker = if selected.as_deref() == Some(task.task_id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {}  {}  {}",
            task.task_id,
            task.status,
            task.last_updated.format("%H:%M:%S")
        );
    }
}

fn print_turn(turn: &Turn) {
    let speaker = if turn.is_from_user() { "you" } else { "agent" };
    let task = turn
        .task
        .as_ref()
        .map(|link| format!(" [task {} - {}]", link.task_id, link.status))
        .unwrap_or_default();
    println!("{speaker}{task}: {}", turn.text);

    for part in &turn.parts {
        match part {
            ConversationPart::Text { .. } => {}
            ConversationPart::File {
                name,
                mime_type,
                content,
            } => {
                let name = name.as_deref().unwrap_or("unnamed file");
                let mime = mime_type.as_deref().unwrap_or("unknown type");
                match content {
                    FileSource::Bytes(bytes) => {
                        println!("  file: {name} ({mime}, {})", format_file_size(bytes.len()))
                    }
                    FileSource::Uri(uri) => println!("  file: {name} ({mime}) at {uri}"),
                }
                if part.is_text() {
                    if let Some(text) = part.text_content() {
                        println!("    {}", text.lines().next().unwrap_or_default());
                    }
                }
            }
            ConversationPart::Data { json } => {
                let summary: Vec<String> = data_summary(json)
                    .into_iter()
                    .map(|(label, value)| format!("{label}: {value}"))
                    .collect();
                println!("  data: {}", summary.join(", "));
            }
        }
    }
}
