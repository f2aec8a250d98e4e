use clap::{Parser as ClapParser, Subcommand};
use qql_lang::cli::{self, CheckOptions, CliError, FilterOptions, OutputFormat};
use qql_lang::config::load_registry;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "qql")]
#[command(about = "QQL - select and sort todo.txt tasks with logical queries")]
#[command(version)]
struct Cli {
    /// Log compilation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tasks matching all given filters
    Filter {
        /// Task file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// QQL formula
        #[arg(short, long)]
        qql: Option<String>,

        /// Position ranges, e.g. "-4,8-"
        #[arg(short, long)]
        range: Option<String>,

        /// Case-insensitive word search in descriptions
        #[arg(short, long)]
        search: Option<String>,

        /// QQL, range or word search, whichever applies first
        #[arg(short = 'Q', long)]
        query: Option<String>,

        /// Sort keys, e.g. "priority desc, description"
        #[arg(long)]
        sort: Option<String>,

        /// JSON config file declaring macros
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON records instead of lines
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },

    /// Compile a query and print its canonical form
    Check {
        /// The QQL query
        query: String,

        /// JSON config file declaring macros
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Check a sort specification instead of a query
        #[arg(long)]
        sort: bool,
    },

    /// List the signatures of all available functions
    Functions {
        /// JSON config file declaring macros
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show documentation (lists categories when none is given)
    Docs {
        /// Category name
        category: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Filter {
            file,
            qql,
            range,
            search,
            query,
            sort,
            config,
            json,
            pretty,
        } => read_tasks(file).and_then(|tasks| {
            let format = match (json, pretty) {
                (true, true) => OutputFormat::JsonPretty,
                (true, false) => OutputFormat::Json,
                _ => OutputFormat::Text,
            };
            let options = FilterOptions {
                tasks,
                qql,
                range,
                search,
                query,
                sort,
                config,
                format,
            };
            cli::execute_filter(&options).map(|out| print!("{}", out))
        }),
        Commands::Check {
            query,
            config,
            sort,
        } => {
            let options = CheckOptions { query, config, sort };
            cli::execute_check(&options).map(|canonical| println!("{}", canonical))
        }
        Commands::Functions { config } => load_registry(config.as_deref())
            .map(|registry| print!("{}", cli::list_functions(&registry)))
            .map_err(CliError::from),
        Commands::Docs { category: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Docs {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_tasks(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}
