use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stdjsonin::compiler::SolcCompiler;
use stdjsonin::config::{Config, ConstructorArgsOverride, ContractId};
use stdjsonin::error::StdJsonError;
use stdjsonin::output::{console, json, OutputFormat};
use stdjsonin::RunOptions;

#[derive(Parser)]
#[command(
    name = "stdjsonin",
    about = "Rebuild Standard JSON Input from compiled contract artifacts",
    version,
    author
)]
struct Cli {
    /// Verbose logging of internal steps
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate <Contract>-input.json and verify it against the artifact
    Generate {
        /// Contracts to process, as <ContractName>[@<address>]
        contracts: Vec<String>,

        /// Project working directory
        #[arg(long, default_value = ".")]
        working_directory: PathBuf,

        /// Config file path (defaults to .stdjsonin.toml in the working directory)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Directory holding <Contract>.json build artifacts
        #[arg(long)]
        build_directory: Option<PathBuf>,

        /// Directory holding the project's Solidity sources
        #[arg(long)]
        contracts_directory: Option<PathBuf>,

        /// Directory the input files are written to (default: the current directory)
        #[arg(long)]
        output_directory: Option<PathBuf>,

        /// solc binary used for verification
        #[arg(long, env = "SOLC")]
        solc: Option<PathBuf>,

        /// Constructor argument override, as string:<hexvalue>
        #[arg(long)]
        force_constructor_args: Option<String>,

        /// Write input files without recompiling
        #[arg(long)]
        skip_verify: bool,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Generate a starter .stdjsonin.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!("DEBUG logging is turned ON");
    tracing::debug!("Running stdjsonin v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Generate {
            contracts,
            working_directory,
            config,
            build_directory,
            contracts_directory,
            output_directory,
            solc,
            force_constructor_args,
            skip_verify,
            format,
        } => cmd_generate(GenerateArgs {
            contracts,
            working_directory,
            config,
            build_directory,
            contracts_directory,
            output_directory,
            solc,
            force_constructor_args,
            skip_verify,
            format,
        }),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            tracing::error!("{e}");
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

struct GenerateArgs {
    contracts: Vec<String>,
    working_directory: PathBuf,
    config: Option<PathBuf>,
    build_directory: Option<PathBuf>,
    contracts_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    solc: Option<PathBuf>,
    force_constructor_args: Option<String>,
    skip_verify: bool,
    format: String,
}

fn cmd_generate(args: GenerateArgs) -> Result<i32, StdJsonError> {
    // Malformed invocations fail before touching the filesystem.
    let contracts = ContractId::parse_all(&args.contracts)?;
    let constructor_args =
        ConstructorArgsOverride::parse_optional(args.force_constructor_args.as_deref())?;

    let format = OutputFormat::from_str_lenient(&args.format).unwrap_or_else(|| {
        tracing::warn!("unknown format '{}', using console", args.format);
        OutputFormat::Console
    });

    let config_path = args
        .config
        .unwrap_or_else(|| args.working_directory.join(".stdjsonin.toml"));
    let mut config = Config::load(&config_path)?;
    if let Some(dir) = args.build_directory {
        config.paths.build_directory = dir;
    }
    if let Some(dir) = args.contracts_directory {
        config.paths.contracts_directory = dir;
    }
    if let Some(solc) = args.solc {
        config.compiler.solc = solc;
    }

    let mut options = RunOptions::from_config(&config, &args.working_directory);
    if let Some(dir) = args.output_directory {
        options.output_dir = dir;
    }
    options.constructor_args = constructor_args;
    options.verify = !args.skip_verify;

    let compiler = SolcCompiler::new(config.compiler.solc);
    match format {
        OutputFormat::Console => {
            stdjsonin::run_with_progress(&contracts, &options, &compiler, &mut |event| {
                print!("{}", console::render_progress(&event));
                let _ = std::io::stdout().flush();
            });
        }
        OutputFormat::Json => {
            let report = stdjsonin::run(&contracts, &options, &compiler);
            println!("{}", json::render(&report)?);
        }
    }

    // Per-contract failures are reported above and do not affect the exit code.
    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, StdJsonError> {
    let path = PathBuf::from(".stdjsonin.toml");

    if path.exists() && !force {
        eprintln!(".stdjsonin.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .stdjsonin.toml");

    Ok(0)
}
