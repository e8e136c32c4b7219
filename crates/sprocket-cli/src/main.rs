use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use sprocket_driver::Options;

mod commands;
mod error;

use commands::{build::handle_build, check::handle_check, run::handle_run};

#[derive(Parser, Debug)]
#[command(name = "sprocket")]
#[command(about = "Sprocket compiler: lowers parsed units to native executables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a unit into an executable
    Build(BuildArgs),

    /// Compile a unit and run the resulting executable
    Run(BuildArgs),

    /// Lower and compile a unit without writing anything
    Check {
        /// Unit to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Config file (defaults to sprocket.toml next to the unit)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Unit to compile
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Output executable (defaults to the unit name without its suffix)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,
    /// Config file (defaults to sprocket.toml next to the unit)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// C compiler used for linking
    #[arg(long = "cc", value_name = "CC")]
    compiler: Option<String>,
    /// Keep the intermediate object file
    #[arg(long)]
    keep_object: bool,
}

impl BuildArgs {
    fn options(&self) -> Options {
        Options {
            output: self.output.clone(),
            config: self.config.clone(),
            compiler: self.compiler.clone(),
            keep_object: self.keep_object,
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .init();

    match cli.command {
        Command::Build(args) => {
            handle_build(&args.file, &args.options())?;
        }
        Command::Run(args) => {
            let code = handle_run(&args.file, &args.options())?;
            std::process::exit(code);
        }
        Command::Check { file, config } => {
            let options = Options {
                config,
                ..Options::default()
            };
            handle_check(&file, &options)?;
        }
    }
    Ok(())
}
