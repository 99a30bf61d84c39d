//! CLI entry point for the Retort backend (for dev and testing).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use retort_core::{
    answer, app_data_dir, ingest, load_config, load_corpus, status, ChatRequest, Config,
    OllamaClient, SelectionPolicy, VectorStore,
};

#[derive(Parser)]
#[command(name = "retort")]
#[command(about = "Retort: semantic FAQ chatbot backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Show where Retort stores its config and embeddings database.
    DataDir,
    /// Embed every corpus question and append it to the embeddings database.
    Ingest {
        /// Path to the corpus JSON file.
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,
        /// Embeddings database path (default: config override or app data dir).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
        /// Clear the store first so re-ingestion replaces instead of duplicating.
        #[arg(long)]
        reset: bool,
    },
    /// Ask one question and print the matched answer.
    Ask {
        /// The message to answer.
        #[arg(value_name = "MESSAGE")]
        message: String,
        /// Path to the corpus JSON file (for answer resolution).
        #[arg(long, value_name = "PATH")]
        corpus: PathBuf,
        /// Embeddings database path (default: config override or app data dir).
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
        /// Override the configured selection policy.
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PolicyArg {
    Nearest,
    Farthest,
}

impl From<PolicyArg> for SelectionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Nearest => SelectionPolicy::Nearest,
            PolicyArg::Farthest => SelectionPolicy::Farthest,
        }
    }
}

fn resolve_db(flag: Option<PathBuf>, config: &Config) -> Option<PathBuf> {
    flag.or_else(|| config.resolve_database_path())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("Retort backend");
            println!("  core: {}", status());
            let config = load_config();
            match config.resolve_database_path() {
                Some(path) => {
                    println!("  database: {}", path.display());
                    if path.exists() {
                        match VectorStore::open(&path).and_then(|s| s.count()) {
                            Ok(n) => println!("  embeddings: {}", n),
                            Err(e) => eprintln!("  store error: {}", e),
                        }
                    } else {
                        println!("  embeddings: none (not ingested yet)");
                    }
                }
                None => eprintln!("  database: could not determine app data directory"),
            }
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => println!("{}", p.display()),
            None => eprintln!("Could not determine app data directory."),
        },
        Commands::Ingest { corpus, db, reset } => {
            let config = load_config();
            let Some(db_path) = resolve_db(db, &config) else {
                eprintln!("Error: could not determine a database path; pass --db.");
                return ExitCode::FAILURE;
            };
            let entries = match load_corpus(&corpus) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let client = match OllamaClient::from_url(&config.ollama_url) {
                Ok(client) => client.with_embed_model(config.embed_model.clone()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let store = match VectorStore::open(&db_path) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if reset {
                if let Err(e) = store.clear() {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            match ingest(&entries, &client, &store).await {
                Ok(n) => println!("Ingested {} question(s) into {}", n, db_path.display()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Commands::Ask { message, corpus, db, policy, json } => {
            let config = load_config();
            let Some(db_path) = resolve_db(db, &config) else {
                eprintln!("Error: could not determine a database path; pass --db.");
                return ExitCode::FAILURE;
            };
            let entries = match load_corpus(&corpus) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let client = match OllamaClient::from_url(&config.ollama_url) {
                Ok(client) => client.with_embed_model(config.embed_model.clone()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let store = match VectorStore::open(&db_path) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let policy = policy.map(SelectionPolicy::from).unwrap_or(config.selection_policy);
            let request = ChatRequest { message: Some(message) };
            match answer(&request, &client, &store, &entries, policy).await {
                Ok(response) => {
                    if json {
                        match serde_json::to_string_pretty(&response) {
                            Ok(s) => println!("{}", s),
                            Err(e) => {
                                eprintln!("Error: {}", e);
                                return ExitCode::FAILURE;
                            }
                        }
                    } else {
                        println!("{}", response.response);
                        println!("  (matched distance: {:.4})", response.distance);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    ExitCode::SUCCESS
}
