use crate::commands::{chat, summarize};
use crate::config::{self, Settings};
use crate::error::AppError;
use crate::llm::ChatRole;
use crate::session::ChatSession;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Summarize text and PDFs, or chat, through a hosted LLM API
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize text passed as an argument, or read from stdin
    Text {
        /// Text to summarize (at most 2000 characters)
        text: Option<String>,
    },

    /// Summarize a PDF and save the summary as a new PDF
    Pdf {
        /// Path to the PDF to summarize
        path: PathBuf,

        /// Where to write the summary PDF
        #[arg(short, long, default_value = summarize::SUMMARY_FILE_NAME)]
        output: PathBuf,

        /// Only print the extracted text, do not call the API
        #[arg(long)]
        extract_only: bool,
    },

    /// Summarize a .txt, .md or .pdf file and print the result
    File {
        /// Path to the file
        path: PathBuf,
    },

    /// Chat with the assistant (/history shows the transcript, /quit exits)
    Chat,

    /// List models available for the configured provider
    Models,

    /// Show the resolved configuration with the API key masked
    Config,
}

pub fn run() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Requests are issued one at a time, so a single-threaded runtime is enough.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_err) => eprintln!("{}", app_err.user_message()),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    // Fail before any work if the credential is missing.
    let settings = Settings::from_env()?;
    tracing::info!(
        provider = settings.provider.name(),
        model = %settings.model,
        "configuration loaded"
    );

    match cli.command {
        Command::Text { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };
            let summary = summarize::summarize_text(&settings.provider, &settings, &text).await?;
            println!("Summary:\n{}", summary);
        }
        Command::Pdf {
            path,
            output,
            extract_only,
        } => {
            let bytes = std::fs::read(&path)?;
            if extract_only {
                println!("{}", summarize::extract_pdf(&bytes)?);
                return Ok(());
            }
            let result = summarize::summarize_pdf(&settings.provider, &settings, &bytes).await?;
            println!("PDF Summary:\n{}", result.summary);
            std::fs::write(&output, &result.download.bytes)?;
            println!(
                "\nSaved {} ({}) to {}",
                result.download.file_name,
                result.download.mime_type,
                output.display()
            );
        }
        Command::File { path } => {
            let summary = summarize::summarize_file(&settings.provider, &settings, &path).await?;
            println!("Summary:\n{}", summary);
        }
        Command::Chat => chat_loop(&settings).await?,
        Command::Models => {
            for model in config::available_models(&settings) {
                let marker = if model.id == settings.model { "*" } else { " " };
                println!("{} {:<28} {} ({})", marker, model.id, model.name, model.provider);
            }
        }
        Command::Config => {
            for (key, value) in settings.display_map() {
                println!("{:<12} {}", key, value);
            }
            println!("\nRead from: {}", config::setting_keys().join(", "));
        }
    }

    Ok(())
}

async fn chat_loop(settings: &Settings) -> anyhow::Result<()> {
    let mut session = ChatSession::new(settings.model.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Chat with the Bot ({}). Type /quit to leave.", settings.model);
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                for message in chat::get_messages(&session) {
                    print_message(message.role, &message.content);
                }
            }
            input => match chat::send_message(&settings.provider, &mut session, input).await {
                Ok(reply) => print_message(reply.role, &reply.content),
                // A failed turn is not fatal; the transcript was rolled back.
                Err(e) => eprintln!("{}", e.user_message()),
            },
        }
    }

    Ok(())
}

fn print_message(role: ChatRole, content: &str) {
    match role {
        ChatRole::User => println!("User: {}", content),
        _ => println!("Bot: {}", content),
    }
}
