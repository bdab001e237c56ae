use clap::{Parser as ClapParser, Subcommand};
use jsonquery_lang::StringifyOptions;
use jsonquery_lang::cli::{self, CheckOptions, CheckResult, CliError, FormatOptions};
use std::io::{self, Read};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "JSONQUERY_LOG";

#[derive(ClapParser)]
#[command(name = "jsonquery")]
#[command(about = "JSON Query - parse, format and run queries against JSON documents")]
#[command(version)]
struct Cli {
    /// Custom operators as a JSON list, e.g. '[{"name":"coalesce","op":"??","after":"|"}]'
    #[arg(long, global = true)]
    operators: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a query
    Check {
        /// The query to execute
        query: String,

        /// Read the query as its JSON form
        #[arg(long)]
        ast: bool,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate the query, don't execute
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the JSON form of a query
    Parse {
        query: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print a query in canonical text form
    Format {
        query: String,

        /// Read the query as its JSON form
        #[arg(long)]
        ast: bool,

        /// One level of indentation
        #[arg(long, default_value = "  ")]
        indent: String,

        /// Longest line before breaking
        #[arg(long, default_value_t = 40)]
        max_line_length: usize,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'jsonquery docs' to list categories)
        category: String,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = cli::parse_operators(cli.operators.as_deref())
        .and_then(|operators| run(cli.command, operators));

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

fn run(
    command: Commands,
    operators: Vec<jsonquery_lang::CustomOperator>,
) -> Result<(), CliError> {
    match command {
        Commands::Check {
            query,
            ast,
            input,
            pretty,
            syntax_only,
        } => {
            let input = if syntax_only { input } else { read_input(input)? };
            let options = CheckOptions {
                query,
                ast,
                input,
                operators,
                syntax_only,
            };

            match cli::execute_check(&options)? {
                CheckResult::SyntaxValid => println!("Query is valid"),
                CheckResult::Success(output) => println!("{}", cli::render(&output, pretty)),
            }
        }
        Commands::Parse { query, pretty } => {
            let json = cli::execute_parse(&query, &operators)?;
            let text = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{}", text);
        }
        Commands::Format {
            query,
            ast,
            indent,
            max_line_length,
        } => {
            let options = FormatOptions {
                query,
                ast,
                stringify: StringifyOptions {
                    operators,
                    indentation: indent,
                    max_line_length,
                },
            };
            println!("{}", cli::execute_format(&options)?);
        }
        Commands::Docs => print!("{}", cli::get_docs_overview()),
        Commands::Doc { category } => print!("{}", cli::get_doc_category(&category)?),
    }
    Ok(())
}

/// The `--input` flag, or stdin when it is piped
fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}
