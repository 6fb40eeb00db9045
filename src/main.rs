use clap::Parser;
use modelq::query::{self, Predicate};
use modelq::{record, store, values, ModelSchema, Record};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modelq", about = "Filter model records with typed query predicates")]
struct Cli {
    #[arg(long, env = "MODELQ_RECORDS", help = "Directory holding record files")]
    records: Option<PathBuf>,

    #[arg(long, env = "MODELQ_SCHEMA", help = "Model schema (YAML)")]
    schema: Option<PathBuf>,

    #[arg(long, help = "Read record file paths from stdin")]
    stdin: bool,

    #[arg(long, help = "Load a serialized predicate tree instead of a query")]
    predicate: Option<PathBuf>,

    #[arg(long, help = "List unique values for a field")]
    values: Option<String>,

    #[arg(long, help = "Show count for each value (use with --values)")]
    count: bool,

    #[arg(help = "Query, e.g. 'rating >= 4 AND status = \"published\"'")]
    query: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(schema_path) = cli.schema else {
        eprintln!("Error: No schema specified. Use --schema or set MODELQ_SCHEMA");
        return ExitCode::from(2);
    };
    let schema = match ModelSchema::load(&schema_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return ExitCode::from(2);
        }
    };

    let root = cli.records.unwrap_or_default();
    let files = if cli.stdin {
        store::read_paths_from_stdin()
    } else if root.as_os_str().is_empty() {
        eprintln!("Error: No records directory specified. Use --records or set MODELQ_RECORDS");
        return ExitCode::from(2);
    } else {
        store::collect_record_files(&root)
    };
    let files = store::exclude_file(files, &schema_path);

    let records = load_all(&files, &root, &schema);
    tracing::debug!(files = files.len(), records = records.len(), model = %schema.name, "loaded records");

    if let Some(field) = cli.values {
        return run_values_mode(&records, &field, cli.count);
    }

    let predicate = match read_predicate(cli.predicate.as_deref(), cli.query.as_deref()) {
        Ok(p) => p,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };
    let predicate = match schema.bind(&predicate) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Query error: {}", e);
            return ExitCode::from(2);
        }
    };
    tracing::debug!(%predicate, "evaluating");

    run_query_mode(&records, &predicate)
}

fn load_all<'s>(files: &[PathBuf], root: &Path, schema: &'s ModelSchema) -> Vec<Record<'s>> {
    let mut records = Vec::new();

    for path in files {
        let label = path.strip_prefix(root).unwrap_or(path).display().to_string();
        match record::load_records(path, &label, schema) {
            Ok(loaded) => records.extend(loaded),
            Err(e) => tracing::warn!("skipping {}: {}", label, e),
        }
    }

    records
}

fn read_predicate(file: Option<&Path>, query_str: Option<&str>) -> Result<Predicate, String> {
    if let Some(path) = file {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error: failed to read {}: {}", path.display(), e))?;
        return serde_yaml::from_str(&content).map_err(|e| format!("Predicate error: {}", e));
    }

    let Some(query_str) = query_str else {
        return Err("Error: No query provided".to_string());
    };
    query::parse(query_str).map_err(|e| format!("Query error: {}", e))
}

fn run_values_mode(records: &[Record<'_>], field: &str, show_count: bool) -> ExitCode {
    let counts = match values::collect_values(records, field) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    if counts.is_empty() {
        return ExitCode::from(1);
    }

    let lines = values::format_values(counts, show_count);
    for line in lines {
        println!("{}", line);
    }

    ExitCode::from(0)
}

fn run_query_mode(records: &[Record<'_>], predicate: &Predicate) -> ExitCode {
    let matched = match predicate.filter(records) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Evaluation error: {}", e);
            return ExitCode::from(2);
        }
    };

    for record in &matched {
        println!("{}", record.label());
    }

    if matched.is_empty() {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}
