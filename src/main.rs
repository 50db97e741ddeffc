mod adapter;
mod config;
mod converters;
mod history;
mod llm_client;
mod logging;
mod models;
mod prompt;
mod session;

use adapter::PromptAdapter;
use anyhow::{Context, anyhow};
use clap::Parser;
use config::Config;
use llm_client::GeminiClient;
use models::{DEFAULT_MODEL, MODEL_OPTIONS, find_model};
use session::ChatSession;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gemini-chat")]
#[command(about = "Chat with Gemini models from the terminal")]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Model to talk to; defaults to the one saved in the config file
    #[arg(short, long)]
    model: Option<String>,

    /// Overrides the api_key of the config file
    #[arg(long)]
    api_key: Option<String>,

    #[arg(long, default_value = llm_client::DEFAULT_API_BASE)]
    api_base: String,

    /// Image attached from the first prompt on
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Image(&'a str),
    ShowImage,
    Clear,
    Models,
    Model(&'a str),
    Reset,
    Quit,
    Help,
    Prompt(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Prompt(trimmed);
    };
    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let arg = arg.trim();
    match name {
        "image" if arg.is_empty() => Command::ShowImage,
        "image" => Command::Image(arg),
        "clear" => Command::Clear,
        "models" => Command::Models,
        "model" if !arg.is_empty() => Command::Model(arg),
        "reset" => Command::Reset,
        "quit" | "exit" => Command::Quit,
        "help" | "model" => Command::Help,
        // A leading slash that is not a command is just text
        _ => Command::Prompt(trimmed),
    }
}

const HELP: &str = "\
/image <path>   attach an image to the following prompts
/image          show the attached image
/clear          detach the image
/models         list available models
/model <name>   switch model (saved to the config file)
/reset          start a new conversation
/quit           leave";

fn print_models(current: &str) {
    for model in MODEL_OPTIONS {
        let marker = if model.name == current { "*" } else { " " };
        println!("{} {}", marker, model);
    }
}

fn persist_model(config_path: &Path, model: &str) {
    if !config_path.exists() {
        println!("{} not found, cannot save model selection.", config_path.display());
        return;
    }
    match Config::save_model_selection(config_path, model) {
        Ok(()) => info!("Saved model selection {} to {}", model, config_path.display()),
        Err(e) => warn!("Failed to save model selection: {:#}", e),
    }
}

async fn repl(session: &mut ChatSession<GeminiClient>, config_path: &Path) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Model: {}. Type /help for commands.", session.adapter().model_name());

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Models => print_models(session.adapter().model_name()),
            Command::Model(name) => {
                if find_model(name).is_none() {
                    println!("Unknown model {}; use /models to list them.", name);
                    continue;
                }
                let client = session.adapter().provider().for_model(name);
                session.switch_adapter(PromptAdapter::new(client));
                persist_model(config_path, name);
                println!("Now using {}.", name);
            }
            Command::Image(path) => match session.attach_image(path) {
                Ok(image) => println!("Attached {} ({}).", image.path.display(), image.mime_type),
                Err(e) => println!("Could not attach image: {:#}", e),
            },
            Command::Clear => {
                session.clear_image();
                println!("Image cleared.");
            }
            Command::ShowImage => match session.image() {
                Some(image) => println!("Attached: {} ({}).", image.path.display(), image.mime_type),
                None => println!("No image attached."),
            },
            Command::Reset => {
                let dropped = session.history().len();
                session.reset();
                println!("Conversation cleared ({} turns dropped).", dropped);
            }
            Command::Prompt(text) => {
                println!("Generating response...");
                let reply = session.send(text).await;
                println!("{}", reply);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(logging::parse_level(&args.log_level), args.log_file.as_deref());

    let config = if args.config.exists() {
        let config = Config::from_file(&args.config)?;
        info!("Configuration loaded from: {}", args.config.display());
        config
    } else {
        warn!("Config file {} not found", args.config.display());
        Config::default()
    };

    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.api_key().map(str::to_string))
        .ok_or_else(|| {
            anyhow!(
                "API Key not found in {}. Please ensure it's present or pass --api-key.",
                args.config.display()
            )
        })?;

    let model = args
        .model
        .clone()
        .or_else(|| config.model_name().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    if find_model(&model).is_none() {
        warn!("Model {} is not in the model table; its limits are unknown", model);
    }

    let client_builder = reqwest::Client::builder();
    let client_builder = if let Some(proxy) = &args.proxy {
        let proxy = reqwest::Proxy::all(proxy).with_context(|| format!("invalid proxy {}", proxy))?;
        client_builder.proxy(proxy)
    } else {
        client_builder
    };
    let http_client = Arc::new(client_builder.build().context("building HTTP client")?);

    let client = GeminiClient::new(http_client, api_key, model).with_api_base(args.api_base.clone());
    let mut session = ChatSession::new(PromptAdapter::new(client));
    if let Some(path) = &args.image {
        session.attach_image(path)?;
    }

    repl(&mut session, &args.config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/image cat.png"), Command::Image("cat.png"));
        assert_eq!(parse_command("  /model   gemini-2.5-flash "), Command::Model("gemini-2.5-flash"));
        assert_eq!(parse_command("/clear"), Command::Clear);
        assert_eq!(parse_command("/models"), Command::Models);
        assert_eq!(parse_command("/reset"), Command::Reset);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/image"), Command::ShowImage);
        assert_eq!(parse_command("/image   "), Command::ShowImage);
        assert_eq!(parse_command("/model"), Command::Help);
    }

    #[test]
    fn test_parse_prompts() {
        assert_eq!(parse_command("hello there"), Command::Prompt("hello there"));
        assert_eq!(parse_command("/usr/bin is where?"), Command::Prompt("/usr/bin is where?"));
        assert_eq!(parse_command("   "), Command::Prompt(""));
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["gemini-chat", "-m", "gemini-2.5-flash", "--image", "a.png"]);
        assert_eq!(args.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(args.image, Some(PathBuf::from("a.png")));
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.api_base, llm_client::DEFAULT_API_BASE);
        assert_eq!(args.log_level, "warn");
    }
}
