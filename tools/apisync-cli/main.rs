use apisync::application::Application;
use apisync::logging;
use apisync::prelude::*;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// --- JSON Deserialization Structs (Input Format Specific) ---
// `applications.json` is either a bare list or wrapped in an `applications` key.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawApplications {
    Wrapped { applications: Vec<Application> },
    List(Vec<Application>),
}

impl RawApplications {
    fn into_vec(self) -> Vec<Application> {
        match self {
            RawApplications::Wrapped { applications } => applications,
            RawApplications::List(applications) => applications,
        }
    }
}

/// Compile endpoint mappings and keep two REST APIs in sync
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a JSON Schema fragment into its addressable nodes
    Flatten {
        /// Path to the schema JSON file
        schema_path: String,
        /// Compute required flags, as done for target bodies
        #[arg(short, long)]
        target: bool,
        /// Namespace the node ids are derived under
        #[arg(short, long, default_value = "schema")]
        namespace: String,
    },
    /// Compare two schemas and print their similarity report
    Compare {
        first_path: String,
        second_path: String,
        /// Also print the best partner of every attribute
        #[arg(short, long)]
        verbose: bool,
    },
    /// Compile every endpoint mapping of a connection
    Compile {
        /// Path to the connection JSON file
        connection_path: String,
        /// Write the compiled connection here
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Run a sync session for a connection until it stops
    Run {
        connection_path: String,
        /// Path to the applications JSON file
        applications_path: String,
        /// Path to an engine configuration JSON file
        #[arg(short, long)]
        config: Option<String>,
        /// Stop the session after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Flatten {
            schema_path,
            target,
            namespace,
        } => run_flatten(&schema_path, target, &namespace),
        Command::Compare {
            first_path,
            second_path,
            verbose,
        } => run_compare(&first_path, &second_path, verbose),
        Command::Compile {
            connection_path,
            out,
        } => run_compile(&connection_path, out.as_deref()),
        Command::Run {
            connection_path,
            applications_path,
            config,
            duration,
        } => run_sync(&connection_path, &applications_path, config.as_deref(), duration),
    }
}

fn read_json(path: &str) -> Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse JSON in '{}': {}", path, e)))
}

fn load_connection(path: &str) -> Connection {
    serde_json::from_value(read_json(path))
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid connection document '{}': {}", path, e)))
}

fn run_flatten(schema_path: &str, target: bool, namespace: &str) {
    let schema = read_json(schema_path);
    let nodes = flatten(&schema, namespace, target);
    let rendered = serde_json::to_string_pretty(&nodes)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to render nodes: {}", e)));
    println!("{}", rendered);
    eprintln!("{} node(s)", nodes.len());
}

fn run_compare(first_path: &str, second_path: &str, verbose: bool) {
    let first = read_json(first_path);
    let second = read_json(second_path);
    let matcher = Matcher::new();

    let start = Instant::now();
    let report = matcher.compare(&first, &second);
    let duration = start.elapsed();

    if verbose {
        for m in matcher.best_matches(&first, &second) {
            println!(
                "  {:<24} edit {:.3} ({})  lexical {:.3} ({})",
                m.name,
                m.edit_distance,
                m.edit_partner.as_deref().unwrap_or("-"),
                m.lexical_distance,
                m.lexical_partner.as_deref().unwrap_or("-"),
            );
        }
    }
    println!("Edit distance average:    {:.4}", report.edit_average);
    println!("Lexical distance average: {:.4}", report.lexical_average);
    println!("Compared in {:?}", duration);
}

fn run_compile(connection_path: &str, out: Option<&str>) {
    let mut connection = load_connection(connection_path);

    let start = Instant::now();
    let failures = connection.save_mappings();
    let duration = start.elapsed();

    println!(
        "Compiled {} endpoint mapping(s) in {:?}",
        connection.endpoint_mappings.len(),
        duration
    );
    for mapping in &connection.endpoint_mappings {
        let status = if mapping.complete { "complete" } else { "incomplete" };
        println!("  -> {} [{:?}] {}", mapping.name(), mapping.kind, status);
        for reason in &mapping.incomplete_reasons {
            println!("       missing {}", reason);
        }
    }
    for (mapping_id, error) in &failures {
        println!("  !! {}: {}", mapping_id, error);
    }
    println!("Connection state: {}", connection.state);

    if let Some(out) = out {
        let rendered = serde_json::to_string_pretty(&connection)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to render connection: {}", e)));
        fs::write(out, rendered)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", out, e)));
        println!("Wrote compiled connection to {}", out);
    }
}

fn run_sync(
    connection_path: &str,
    applications_path: &str,
    config_path: Option<&str>,
    duration: Option<u64>,
) {
    let config = match config_path {
        Some(path) => SyncConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => SyncConfig::default(),
    };
    logging::init(&config.log);

    let mut connection = load_connection(connection_path);
    for (mapping_id, error) in connection.save_mappings() {
        eprintln!("Mapping '{}' did not compile: {}", mapping_id, error);
    }
    let connection_id = connection.id.clone();

    let applications: Vec<Application> =
        serde_json::from_value::<RawApplications>(read_json(applications_path))
            .map(RawApplications::into_vec)
            .unwrap_or_else(|e| exit_with_error(&format!("Invalid applications document: {}", e)));

    let mut store = MemoryStore::new().with_connection(connection.clone());
    for application in applications {
        store = store.with_application(application);
    }
    let client = HttpClient::for_connection(&store, &connection, config.http_timeout())
        .unwrap_or_else(|e| exit_with_error(&format!("Could not build the HTTP client: {}", e)));

    let manager = SessionManager::new(
        Arc::new(store),
        Arc::new(client),
        Arc::new(FnTransforms::new()),
        Arc::new(MemoryCache::new()),
        config,
    );
    manager
        .start_with_defaults(&connection_id)
        .unwrap_or_else(|e| exit_with_error(&format!("Could not start synchronization: {}", e)));

    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut seen = 0;
    loop {
        if let Some(log) = manager.log(&connection_id) {
            for entry in log.entries_since(seen) {
                println!("{} [{}] {}", entry.timestamp.to_rfc3339(), entry.level, entry.message);
                seen += 1;
            }
        }
        if manager.state(&connection_id) == SessionState::Stopped {
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            if let Err(e) = manager.stop(&connection_id) {
                eprintln!("Could not stop synchronization: {}", e);
            }
        }
        thread::sleep(Duration::from_millis(200));
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
