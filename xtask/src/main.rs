use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "compliance_rule_lambda";
const LAMBDA_BIN: &str = "evaluate_lambda";
/// Entry name the `provided` Lambda runtimes execute.
const BOOTSTRAP_ENTRY: &str = "bootstrap";
const BOOTSTRAP_MODE: u32 = 0o755;

#[derive(Debug, thiserror::Error)]
enum XtaskError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("writing lambda archive: {0}")]
    Archive(#[from] ZipError),
    #[error("`cargo {command}` exited with status {code}")]
    CargoFailed { command: String, code: i32 },
    #[error("lambda binary not found at {0}")]
    MissingBinary(PathBuf),
}

impl XtaskError {
    fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

#[derive(Parser)]
#[command(name = "xtask", about = "Task runner for the compliance rule workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Formatting, lints and tests for every crate
    Ci,
    /// Build the evaluation Lambda and zip it as `bootstrap`
    LambdaPackage {
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        #[arg(long, env = "LAMBDA_DIST_DIR", default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

const CI_STEPS: &[(&str, &[&str])] = &[
    ("formatting", &["fmt", "--all", "--", "--check"]),
    (
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    ),
    ("core tests", &["test", "-p", "compliance_rule_core"]),
    ("lambda tests", &["test", "-p", LAMBDA_PACKAGE]),
];

fn cargo(args: &[&str]) -> Result<(), XtaskError> {
    let command = args.join(" ");
    eprintln!("+ cargo {command}");
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(XtaskError::io("spawning cargo"))?;
    if status.success() {
        Ok(())
    } else {
        Err(XtaskError::CargoFailed {
            command,
            code: status.code().unwrap_or(1),
        })
    }
}

fn run_ci() -> Result<(), XtaskError> {
    for (label, args) in CI_STEPS {
        eprintln!("\n== {label}");
        cargo(args)?;
    }
    Ok(())
}

fn package_lambda(
    target: &str,
    profile: BuildProfile,
    dist_dir: &Path,
) -> Result<PathBuf, XtaskError> {
    let mut build = vec![
        "build", "-p", LAMBDA_PACKAGE, "--bin", LAMBDA_BIN, "--target", target,
    ];
    if let BuildProfile::Release = profile {
        build.push("--release");
    }
    cargo(&build)?;

    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BIN);
    if !binary_path.is_file() {
        return Err(XtaskError::MissingBinary(binary_path));
    }
    let binary = fs::read(&binary_path)
        .map_err(XtaskError::io(format!("reading {}", binary_path.display())))?;

    fs::create_dir_all(dist_dir)
        .map_err(XtaskError::io(format!("creating {}", dist_dir.display())))?;
    let zip_path = dist_dir.join(format!("{LAMBDA_BIN}.zip"));
    let archive = fs::File::create(&zip_path)
        .map_err(XtaskError::io(format!("creating {}", zip_path.display())))?;
    write_bootstrap_archive(archive, &binary)?;
    Ok(zip_path)
}

/// Writes `binary` as the single executable `bootstrap` entry of a zip.
fn write_bootstrap_archive<W: Write + Seek>(sink: W, binary: &[u8]) -> Result<W, XtaskError> {
    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(BOOTSTRAP_MODE);
    zip.start_file(BOOTSTRAP_ENTRY, options)?;
    zip.write_all(binary)
        .map_err(XtaskError::io("writing bootstrap entry"))?;
    Ok(zip.finish()?)
}

fn main() -> ExitCode {
    let outcome = match Cli::parse().command {
        Commands::Ci => run_ci().map(|()| eprintln!("\nci passed")),
        Commands::LambdaPackage {
            target,
            profile,
            dist_dir,
        } => package_lambda(&target, profile, &dist_dir)
            .map(|zip_path| eprintln!("\npackaged {}", zip_path.display())),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
