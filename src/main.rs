use clap::{Parser, Subcommand};
use jpt::cli::{
    check_default_output, default_jpt_path, default_split_paths, inspect, merge_files,
    show_info, split_file, MergeOptions,
};
use jpt::{FileRole, FormatVersion};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("JPT_VERSION");
const BUILD: &str = env!("JPT_BUILD");
const PROFILE: &str = env!("JPT_PROFILE");
const GIT_HASH: &str = env!("JPT_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH)
    })
}

#[derive(Parser)]
#[command(name = "jpt")]
#[command(author, about = "Merge a JPEG and a PNG into a JPT container, or split one back", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a JPEG file and a PNG file into a JPT container
    #[command(alias = "m")]
    Merge {
        /// JPEG input file
        jpeg: PathBuf,

        /// PNG input file
        png: PathBuf,

        /// Output JPT file (defaults to the JPEG path with a .jpt extension)
        output: Option<PathBuf>,

        /// Container layout: v2 (64-bit lengths) or v1 (32-bit, engine-compatible)
        #[arg(long, default_value = "v2", value_parser = parse_format)]
        format: FormatVersion,
    },

    /// Split a JPT container into its JPEG and PNG files
    #[command(alias = "s")]
    Split {
        /// Input JPT file
        input: PathBuf,

        /// Output JPEG file (defaults to the input path with a .jpg extension)
        jpeg: Option<PathBuf>,

        /// Output PNG file (defaults to the input path with a .png extension)
        png: Option<PathBuf>,
    },

    /// Validate a JPT file and show its contents
    #[command(alias = "i")]
    Info {
        /// JPT file to inspect
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_format(s: &str) -> Result<FormatVersion, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Use an explicit path as given; a derived one must not overwrite an input
fn defaulted(
    explicit: Option<PathBuf>,
    derived: PathBuf,
    role: FileRole,
    inputs: &[&Path],
) -> jpt::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => check_default_output(&derived, role, inputs).map(|_| derived),
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --version flag
    if cli.version {
        println!("jpt {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.quiet, cli.verbose);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Merge {
            jpeg,
            png,
            output,
            format,
        } => {
            let options = MergeOptions { format };
            let inputs = [jpeg.as_path(), png.as_path()];
            defaulted(output, default_jpt_path(&jpeg), FileRole::Jpt, &inputs)
                .and_then(|output| merge_files(&output, &jpeg, &png, &options))
                .map(|report| println!("{}", report))
        }

        Commands::Split { input, jpeg, png } => {
            let (default_jpeg, default_png) = default_split_paths(&input);
            let inputs = [input.as_path()];
            let jpeg = defaulted(jpeg, default_jpeg, FileRole::Jpeg, &inputs);
            let png = defaulted(png, default_png, FileRole::Png, &inputs);
            jpeg.and_then(|jpeg| png.map(|png| (jpeg, png)))
                .and_then(|(jpeg, png)| split_file(&input, &jpeg, &png))
                .map(|report| println!("{}", report))
        }

        Commands::Info { file, json } => {
            if json {
                inspect(&file)
                    .and_then(|info| info.to_json())
                    .map(|out| println!("{}", out))
            } else {
                show_info(&file).map(|info| print!("{}", info))
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
