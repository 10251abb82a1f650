//! Voltguard CLI - robot electrical spec validation from the command line.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use voltguard::catalog::builtin::BUILTIN_PARTS;
use voltguard::{CheckOptions, CheckResult, PartStore, Severity, SpecChecker, VoltguardError};

mod templates;

#[derive(Parser)]
#[command(name = "voltguard")]
#[command(about = "Electrical compatibility checks for robot specs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a robot spec against deterministic electrical rules
    #[command(alias = "validate")]
    Check {
        /// Path to the YAML spec
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Additional parts directory (repeatable; searched after the
        /// project parts/ dir and the built-in library)
        #[arg(long, value_name = "DIR")]
        parts_dir: Vec<PathBuf>,

        /// Write compact JSON to a file (requires --format json)
        #[arg(long, value_name = "PATH")]
        out_file: Option<PathBuf>,

        /// Pretty-print JSON to stdout (requires --format json)
        #[arg(long)]
        pretty: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Generate a starter robot spec from a template
    Init {
        /// Template name (see --list)
        #[arg(long, value_name = "NAME")]
        template: Option<String>,

        /// Output path
        #[arg(long, value_name = "PATH", default_value = "robot.yaml")]
        out: PathBuf,

        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,

        /// List available templates
        #[arg(long)]
        list: bool,
    },

    /// List the built-in part library
    Parts {
        /// Show display names and manufacturer part numbers
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions annotations
    Github,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check {
            file,
            format,
            parts_dir,
            out_file,
            pretty,
            no_color,
        } => handle_check(&file, format, parts_dir, out_file, pretty, no_color),
        Commands::Init {
            template,
            out,
            force,
            list,
        } => handle_init(template, &out, force, list),
        Commands::Parts { verbose } => {
            handle_parts(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn handle_check(
    file: &Path,
    format: OutputFormat,
    parts_dir: Vec<PathBuf>,
    out_file: Option<PathBuf>,
    pretty: bool,
    no_color: bool,
) -> i32 {
    if out_file.is_some() && format != OutputFormat::Json {
        eprintln!("Error: --out-file requires --format json");
        return 3;
    }
    if pretty && format != OutputFormat::Json {
        eprintln!("Error: --pretty requires --format json");
        return 3;
    }

    let mut parts_dirs = parts_dir;
    if let Some(env_dirs) = std::env::var_os("VOLTGUARD_PARTS_DIRS") {
        parts_dirs.extend(std::env::split_paths(&env_dirs).filter(|p| !p.as_os_str().is_empty()));
    }

    let options = CheckOptions {
        project_root: None,
        parts_dirs,
    };

    match SpecChecker::check_file(file, options) {
        Ok(result) => {
            let exit_code = if result.has_errors() { 2 } else { 0 };
            match format {
                OutputFormat::Human => {
                    output_human(&result, exit_code, &Palette::detect(no_color))
                }
                OutputFormat::Json => {
                    let payload = json_report(file, &result, exit_code);
                    if output_json(&payload, pretty, out_file.as_deref()) != 0 {
                        return 3;
                    }
                }
                OutputFormat::Github => output_github(&result),
            }
            exit_code
        }
        Err(e) => {
            if format == OutputFormat::Json {
                let payload = json_error(file, 3, &e);
                output_json(&payload, pretty, out_file.as_deref());
            } else {
                eprintln!("Error: {}", render_error(&e));
            }
            3
        }
    }
}

/// Walk the source chain so catalog errors keep their searched-path detail.
/// Skips links whose text the message already carries (io errors embed).
fn render_error(err: &VoltguardError) -> String {
    use std::error::Error;
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

fn output_human(result: &CheckResult, exit_code: i32, palette: &Palette) {
    println!("{}", palette.paint(HEADER, "voltguard check"));
    println!("{}", palette.paint(HEADER, "---------------"));
    for finding in &result.report.findings {
        let severity = finding.severity.to_string();
        print!("{} {}: ", palette.severity(finding.severity, &severity), finding.code);
        if let Some(loc) = &finding.location {
            print!("{}:{} ", loc.file, loc.line);
        }
        println!("{}", finding.message);
    }
    let s = result.summary;
    println!();
    println!(
        "{} error(s), {} warning(s), {} info(s), exit code: {}",
        s.errors, s.warnings, s.infos, exit_code
    );
}

fn json_report(file: &Path, result: &CheckResult, exit_code: i32) -> serde_json::Value {
    let findings: Vec<_> = result
        .report
        .findings
        .iter()
        .map(|f| {
            serde_json::json!({
                "id": f.code,
                "severity": f.severity.to_string(),
                "message": f.message,
                "path": f.path,
                "location": f.location.as_ref().map(|l| {
                    serde_json::json!({ "line": l.line, "column": l.column })
                }),
                "meta": {},
            })
        })
        .collect();

    serde_json::json!({
        "spec_file": file.display().to_string(),
        "summary": {
            "errors": result.summary.errors,
            "warnings": result.summary.warnings,
            "infos": result.summary.infos,
            "exit_code": exit_code,
        },
        "findings": findings,
    })
}

fn json_error(file: &Path, exit_code: i32, err: &VoltguardError) -> serde_json::Value {
    serde_json::json!({
        "spec_file": file.display().to_string(),
        "summary": { "errors": 1, "warnings": 0, "infos": 0, "exit_code": exit_code },
        "findings": [{
            "id": "PARSER_ERROR",
            "severity": "ERROR",
            "message": render_error(err),
            "path": null,
            "location": null,
            "meta": {},
        }],
    })
}

fn output_json(payload: &serde_json::Value, pretty: bool, out_file: Option<&Path>) -> i32 {
    if let Some(path) = out_file {
        let compact = payload.to_string();
        if let Err(e) = std::fs::write(path, compact) {
            eprintln!("Error: write json: {}", e);
            return 3;
        }
    }
    let rendered = if pretty {
        serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
    } else {
        payload.to_string()
    };
    println!("{}", rendered);
    if let Some(path) = out_file {
        if !pretty {
            println!("Written to {}", path.display());
        }
    }
    0
}

fn severity_to_github(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warn => "warning",
        Severity::Info => "notice",
    }
}

fn output_github(result: &CheckResult) {
    for finding in &result.report.findings {
        let level = severity_to_github(finding.severity);
        match &finding.location {
            Some(loc) => println!(
                "::{} file={},line={}::{}: {}",
                level,
                loc.file,
                loc.line,
                finding.code,
                finding.message.replace('\n', " ")
            ),
            None => println!(
                "::{} file={}::{}: {}",
                level,
                result.file.display(),
                finding.code,
                finding.message.replace('\n', " ")
            ),
        }
    }
}

fn handle_init(template: Option<String>, out: &Path, force: bool, list: bool) -> i32 {
    if list {
        for name in templates::names() {
            println!("{}", name);
        }
        return 0;
    }

    let name = match template.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            eprintln!("Error: missing --template (use --list to see available templates)");
            return 2;
        }
    };

    let data = match templates::load(name) {
        Some(data) => data,
        None => {
            eprintln!(
                "Error: unknown template {:?} (use --list to see available templates)",
                name
            );
            return 2;
        }
    };

    if out.exists() && !force {
        eprintln!(
            "Error: output file exists: {} (use --force to overwrite)",
            out.display()
        );
        return 2;
    }

    if let Err(e) = std::fs::write(out, data) {
        eprintln!("Error: write template: {}", e);
        return 2;
    }

    println!("Wrote {} (template: {})", out.display(), name);
    0
}

fn handle_parts(verbose: bool) {
    let store = PartStore::builtin();
    println!("Built-in parts:\n");
    for (id, _) in BUILTIN_PARTS {
        if !verbose {
            println!("  {}", id);
            continue;
        }
        let detail = if id.starts_with("drivers/") {
            store.load_driver(id).map(|p| (p.name, p.mpn)).ok()
        } else if id.starts_with("motors/") {
            store.load_motor(id).map(|p| (p.name, p.mpn)).ok()
        } else if id.starts_with("mcus/") {
            store.load_mcu(id).map(|p| (p.name, p.mpn)).ok()
        } else {
            store.load_i2c_sensor(id).map(|p| (p.name, p.mpn)).ok()
        };
        match detail {
            Some((name, mpn)) => println!("  {}\n    {} ({})", id, name, mpn),
            None => println!("  {}", id),
        }
    }
}

const HEADER: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Explicit color configuration passed into the renderers; no global state.
struct Palette {
    enabled: bool,
}

impl Palette {
    fn detect(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Palette { enabled }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn severity(&self, severity: Severity, text: &str) -> String {
        let color = match severity {
            Severity::Error => RED,
            Severity::Warn => YELLOW,
            Severity::Info => CYAN,
        };
        self.paint(color, text)
    }
}
