use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_BIN: &str = "custom_resource";
const WATERMARK_ASSET: &str = "assets/aws-logo.png";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the custom resource workspace",
    long_about = "A unified CLI for CI checks and Lambda packaging in the\n\
                  custom resource workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the custom resource Lambda as a deployable zip
    Package {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving the zip artifact
        #[arg(long, default_value = "dist")]
        dist_dir: String,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Lint + test
    Check,
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

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_custom_resource_lambda(target: &str, profile: BuildProfile, dist_dir: &Path) {
    preflight_lambda_target(target);

    step("Build custom resource lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        "custom_resource_lambda",
        "--target",
        target,
        "--bin",
        LAMBDA_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BIN);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join("custom-resource.zip");
    package_lambda_zip(&binary_path, &zip_path, Path::new(WATERMARK_ASSET));

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

/// Lambda's `provided` runtimes execute a Linux `bootstrap`; refuse anything
/// else before spending a build on it.
fn preflight_lambda_target(target: &str) {
    let Some(arch) = target.strip_suffix("-unknown-linux-gnu") else {
        fail(&format!(
            "`{target}` cannot run on Lambda; use x86_64-unknown-linux-gnu or aarch64-unknown-linux-gnu"
        ));
    };

    match installed_rust_targets() {
        Some(installed) if !installed.iter().any(|line| line == target) => fail(&format!(
            "rust target `{target}` is missing; run `rustup target add {target}`"
        )),
        Some(_) => {}
        None => eprintln!("warning: could not query rustup; skipping target check"),
    }

    if cfg!(target_os = "linux") && std::env::consts::ARCH == arch {
        return;
    }

    let configured = [format!("CC_{}", target.replace('-', "_")), "TARGET_CC".to_string()]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|linker| !linker.trim().is_empty());
    let linker = configured.unwrap_or_else(|| format!("{arch}-linux-gnu-gcc"));
    if !linker_responds(&linker) {
        fail(&format!(
            "no working C linker `{linker}` for `{target}`; install it or set TARGET_CC (rustls pulls in ring, which needs one)"
        ));
    }
}

fn installed_rust_targets() -> Option<Vec<String>> {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;

    Some(
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .collect(),
    )
}

fn linker_responds(linker: &str) -> bool {
    let mut words = linker.split_whitespace();
    let Some(program) = words.next() else {
        return false;
    };

    Command::new(program)
        .args(words)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    exit(1);
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path, asset_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");

    // The watermark is optional; without it only the Watermark resource fails.
    if asset_path.exists() {
        let asset = fs::read(asset_path).expect("failed to read watermark asset");
        let asset_options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        zip.start_file(WATERMARK_ASSET, asset_options)
            .expect("failed to start watermark entry in lambda zip");
        zip.write_all(&asset)
            .expect("failed to write watermark entry");
    } else {
        eprintln!(
            "warning: '{}' not found; packaging without a watermark asset",
            asset_path.display()
        );
    }

    zip.finish().expect("failed to finish lambda zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test custom_resource_core");
    run_cargo(&["test", "-p", "custom_resource_core"]);

    step("Test custom_resource_lambda");
    run_cargo(&["test", "-p", "custom_resource_lambda"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Package {
            target,
            profile,
            dist_dir,
        } => {
            package_custom_resource_lambda(&target, profile, Path::new(&dist_dir));
        }
    }
}
