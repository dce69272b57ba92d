use clap::{ArgAction, Parser, Subcommand};
use snapshot_assert_rs::composite::compose;
use snapshot_assert_rs::diff::diff;
use snapshot_assert_rs::store::snapshot_path;
use snapshot_assert_rs::{
    Comparison, SnapshotColor, SnapshotError, SnapshotImage, Snapshots,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// snapshot-assert: Compare rendered PNG images against stored snapshots
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a PNG against the named snapshot, creating the snapshot if missing
    Compare {
        /// Snapshot name (the file is <storage-root>/<name>.png)
        #[arg(short, long)]
        name: String,

        /// Path to the actual PNG image
        #[arg(short, long)]
        actual: PathBuf,

        /// Directory holding the snapshots
        #[arg(long, default_value = ".snapshots")]
        storage_root: PathBuf,

        /// Directory for diff artifacts (defaults to the platform temp directory)
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// CSS color used to highlight differing pixels
        #[arg(long, default_value = "#00ff00")]
        diff_color: String,
    },

    /// Write the expected | diff | actual composite of two PNG files
    Diff {
        /// Path to the expected PNG image
        expected: PathBuf,

        /// Path to the actual PNG image
        actual: PathBuf,

        /// Path of the composite PNG to write
        #[arg(short, long)]
        output: PathBuf,

        /// CSS color used to highlight differing pixels
        #[arg(long, default_value = "#00ff00")]
        diff_color: String,
    },
}

const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Compare {
            name,
            actual,
            storage_root,
            temp_dir,
            diff_color,
        } => run_compare(name, actual, storage_root, temp_dir, &diff_color),
        Commands::Diff {
            expected,
            actual,
            output,
            diff_color,
        } => run_diff(expected, actual, output, &diff_color),
    };

    match result {
        Ok(code) => code,
        Err(err) if err.is_mismatch() => {
            println!("{}", err);
            ExitCode::from(EXIT_MISMATCH)
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run_compare(
    name: String,
    actual: PathBuf,
    storage_root: PathBuf,
    temp_dir: Option<PathBuf>,
    diff_color: &str,
) -> Result<ExitCode, SnapshotError> {
    let actual = SnapshotImage::open(&actual)?;

    let mut builder = Snapshots::builder()
        .storage_root(storage_root)
        .diff_color_str(diff_color)?;
    if let Some(temp_dir) = temp_dir {
        builder = builder.temp_dir(temp_dir);
    }
    let snapshots = builder.build();
    log::debug!(
        "comparing {}x{} image against {:?}",
        actual.width(),
        actual.height(),
        snapshot_path(snapshots.storage_root(), &name)
    );

    match snapshots.compare(&name, &actual)? {
        Comparison::Created { path } => println!("created {}", path.display()),
        Comparison::Matched => println!("matched"),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_diff(
    expected: PathBuf,
    actual: PathBuf,
    output: PathBuf,
    diff_color: &str,
) -> Result<ExitCode, SnapshotError> {
    let color = SnapshotColor::parse(diff_color)?;
    let expected = SnapshotImage::open(&expected)?;
    let actual = SnapshotImage::open(&actual)?;

    let result = diff(&expected, &actual, color);
    let composite = compose(&result.image, &expected, &actual);

    composite.save(&output)?;

    println!("{} pixels differ", result.diff_pixels);
    if result.is_identical() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_MISMATCH))
    }
}
