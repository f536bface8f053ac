//! Block Assist - Entry Point
//!
//! Interactive loop over a single block. Type commands in plain language and
//! the assistant routes them to the right handler, then prints the result.
//! Works without an LLM key; only rule-matched property changes apply then.

use block_assist::core::config::{set_config, AssistConfig};
use block_assist::core::error::Result;
use block_assist::core::types::{PropertyTree, SessionId};
use block_assist::llm::client::{LlmClient, TextGenerator};
use block_assist::orchestrator::OperationInput;
use block_assist::schema::registry::{BlockRegistry, SchemaProvider};
use block_assist::Assistant;
use clap::Parser;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Edit a page block with natural-language commands
#[derive(Parser, Debug)]
#[command(name = "block-assist")]
#[command(about = "Edit a page block with natural-language commands")]
struct Args {
    /// Block type to edit (hero, features, cta, testimonials, text, ...)
    #[arg(long, default_value = "hero")]
    block_type: String,

    /// TOML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of extra TOML block definitions
    #[arg(long)]
    schemas: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "block_assist=debug".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AssistConfig::load_file(path)?,
        None => AssistConfig::default(),
    };
    if set_config(config.clone()).is_err() {
        tracing::warn!("Global config already initialised");
    }

    let mut registry = BlockRegistry::builtin();
    if let Some(dir) = &args.schemas {
        let loaded = registry.load_directory(dir)?;
        tracing::info!("Loaded {} block definition(s) from {}", loaded.len(), dir.display());
    }

    let Some(defaults) = registry.defaults(&args.block_type) else {
        println!(
            "Unknown block type '{}'. Available: {}",
            args.block_type,
            registry.block_types().join(", ")
        );
        return Ok(());
    };

    let rt = Runtime::new()?;

    // Optional - rule-matched commands still work without it
    let generator: Option<Arc<dyn TextGenerator>> = match LlmClient::from_env() {
        Ok(client) => Some(Arc::new(client)),
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - running with rules only");
            None
        }
    };
    let has_generator = generator.is_some();

    let assistant = Assistant::new(Arc::new(registry), generator, &config);
    let session = SessionId::new();
    let mut tree: PropertyTree = defaults.clone();

    println!("\n=== BLOCK ASSIST ===");
    println!("Editing a '{}' block", args.block_type);
    println!();
    println!("Commands:");
    println!("  show / s        - Print the current block properties");
    println!("  reset           - Restore the block defaults");
    println!("  quit / q        - Exit");
    println!("  <any text>      - Editing command, e.g. \"add a bit more padding\"");
    if !has_generator {
        println!("  (set LLM_API_KEY to enable content rewriting and chat)");
    }
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "show" || input == "s" {
            println!("{}", serde_json::to_string_pretty(&tree)?);
            continue;
        }

        if input == "reset" {
            tree = defaults.clone();
            println!("Block reset to defaults.");
            continue;
        }

        let request = OperationInput::new(input, &args.block_type, tree.clone()).with_session(session);
        match rt.block_on(assistant.handle(&request)) {
            Ok(dispatched) => {
                let route = &dispatched.classification;
                println!(
                    "[{} via {:?}, {:.0}%]",
                    route.agent_name,
                    route.method,
                    route.confidence * 100.0
                );
                for change in &dispatched.output.changes {
                    println!("  {} -> {}", change.path, change.new_value);
                }
                println!("{}", dispatched.output.message);
                if let Some(new_tree) = dispatched.output.tree {
                    tree = new_tree;
                }
            }
            Err(e) => {
                tracing::debug!("Command failed: {}", e);
                println!("{}", e.user_message());
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
