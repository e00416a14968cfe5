mod view;

use clap::{Parser, Subcommand};
use lib::controller::{Controller, Key, KeyOutcome};
use lib::gateway::HttpChatGateway;
use lib::scroll::ScrollTarget;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "canchat")]
#[command(about = "CAN 2025 chatbot client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Write the default configuration file if it does not exist.
    Init {
        /// Config file path (default: CANCHAT_CONFIG_PATH or ~/.canchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Chat interactively. Enter sends; end a line with `\` to continue on the next line. `/quit` exits.
    Chat {
        /// Config file path (default: CANCHAT_CONFIG_PATH or ~/.canchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Send a single question and print the reply.
    Ask {
        /// Config file path (default: CANCHAT_CONFIG_PATH or ~/.canchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Question text.
        message: String,
    },

    /// Query the chat service health endpoint.
    Health {
        /// Config file path (default: CANCHAT_CONFIG_PATH or ~/.canchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the reference chat service (answers with the configured Ollama model).
    Serve {
        /// Config file path (default: CANCHAT_CONFIG_PATH or ~/.canchat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 5555)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("canchat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config),
        Some(Commands::Chat { config }) => run_chat(config).await,
        Some(Commands::Ask { config, message }) => run_ask(config, message).await,
        Some(Commands::Health { config }) => run_health(config).await,
        Some(Commands::Serve { config, port }) => run_serve(config, port).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    if lib::config::init_config(&path)? {
        println!("wrote default configuration to {}", path.display());
    } else {
        println!("configuration already exists at {}", path.display());
    }
    Ok(())
}

fn build_controller(config_path: Option<PathBuf>) -> anyhow::Result<Controller<HttpChatGateway>> {
    let (config, path) = lib::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    let gateway = HttpChatGateway::from_config(&config);
    log::info!("chat endpoint: {}", gateway.endpoint());
    Ok(Controller::new(
        gateway,
        lib::config::resolve_welcome_message(&config.chat),
    ))
}

async fn run_chat(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let mut controller = build_controller(config_path)?;
    let mut view = view::TerminalView::new();
    view.layout(controller.messages());
    let _ = view.scroll_to_bottom(controller.messages().len() - 1);

    let stdin = io::stdin();
    loop {
        {
            let mut stdout = io::stdout();
            write!(stdout, "{}", if controller.draft().is_empty() { "> " } else { ". " })?;
            stdout.flush()?;
        }
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if controller.draft().is_empty() {
            let command = line.trim();
            if command.eq_ignore_ascii_case("/exit") || command.eq_ignore_ascii_case("/quit") {
                break;
            }
        }

        // A trailing backslash stands in for shift+enter: keep the line, insert a newline.
        let (text, shift_held) = match line.strip_suffix('\\') {
            Some(rest) => (rest, true),
            None => (line, false),
        };
        controller.draft_mut().push_str(text);
        if !shift_held {
            trim_trailing_newlines(controller.draft_mut());
        }
        match controller.handle_submit_key(Key::Enter, shift_held) {
            KeyOutcome::PassThrough => {
                controller.draft_mut().push('\n');
                continue;
            }
            KeyOutcome::Handled(None) => {
                // Blank input: nothing to send, start over.
                controller.set_draft("");
                continue;
            }
            KeyOutcome::Handled(Some(turn)) => {
                view.layout(controller.messages());
                controller.after_layout(Some(&mut view));
                view.waiting();
                controller.run_turn(turn).await;
            }
        }
        view.layout(controller.messages());
        controller.after_layout(Some(&mut view));
    }

    Ok(())
}

/// Drop newlines left by `\` continuations when the draft is committed with an empty line.
fn trim_trailing_newlines(draft: &mut String) {
    let len = draft.trim_end_matches('\n').len();
    draft.truncate(len);
}

async fn run_ask(config_path: Option<PathBuf>, message: String) -> anyhow::Result<()> {
    let mut controller = build_controller(config_path)?;
    match controller.send(&message).await {
        Some(reply) => println!("{}", reply.text()),
        None => anyhow::bail!("message is empty"),
    }
    Ok(())
}

async fn run_health(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let gateway = HttpChatGateway::from_config(&config);
    let health = gateway
        .health()
        .await
        .map_err(|e| anyhow::anyhow!("{} ({:?})", e, e.kind()))?;
    println!(
        "{}: status={} chatbot_loaded={} timestamp={}",
        gateway.endpoint(),
        health.status,
        health.chatbot_loaded,
        health.timestamp
    );
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, _) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting chat service on {}:{}", config.server.bind, config.server.port);
    lib::service::run_server(config).await
}
