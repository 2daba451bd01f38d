use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use apastyle_core::{
    render_text, AcademicDocument, AttributeDumpRenderer, ComplianceChecker, ComplianceProcessor,
    DocumentRenderer, ProfileManager, ReportView, Severity, StyleProfile, DEFAULT_PROFILE,
};

#[derive(Parser)]
#[command(name = "apastyle")]
#[command(version, about = "Check academic documents against APA 7 formatting rules")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check .docx files or JSON attribute dumps for compliance
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a document model and write its laid-out attributes as JSON
    Generate {
        /// Document model (.yaml, .yml or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Attribute dump to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Print the active rule set as YAML
    Rules {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// List built-in and user profiles
    Profiles,
}

#[derive(Args)]
struct ProfileArgs {
    /// Profile name (built-in or <config dir>/apastyle/profiles/<name>.yaml)
    #[arg(short, long, conflicts_with = "config")]
    profile: Option<String>,

    /// Path to a profile file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Check {
            files,
            profile,
            format,
            output,
        } => run_check(&files, &profile, format, output.as_deref()),
        Command::Generate { input, output, profile } => run_generate(&input, &output, &profile),
        Command::Rules { profile } => run_rules(&profile),
        Command::Profiles => run_profiles(),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(1);
        }
    }
}

fn resolve_profile(args: &ProfileArgs) -> Result<StyleProfile> {
    if let Some(path) = &args.config {
        let profile = StyleProfile::load_from_file(path)?;
        info!("Loaded profile '{}' from {}", profile.name, path.display());
        return Ok(profile);
    }

    let name = args.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    let profile = ProfileManager::new().resolve(name)?;
    debug!("Using profile '{}'", profile.name);
    Ok(profile)
}

/// Returns Ok(false) when any file is non-compliant or could not be checked.
fn run_check(files: &[PathBuf], args: &ProfileArgs, format: OutputFormat, output: Option<&Path>) -> Result<bool> {
    let profile = resolve_profile(args)?;
    let processor = ComplianceProcessor::new(profile)?;
    info!("Checking {} file(s) with profile '{}'", files.len(), processor.profile().name);
    let results = processor.check_files(files);

    let all_ok = results
        .iter()
        .all(|(_, result)| result.as_ref().is_ok_and(|record| record.report.is_compliant()));

    let rendered = match format {
        OutputFormat::Text => {
            let mut text = String::new();
            for (path, result) in &results {
                match result {
                    Ok(record) => {
                        text.push_str(&format!("📄 {} ({})\n", path.display(), record.extractor));
                        text.push_str(&render_text(&ReportView::from_report(&record.report)));
                        text.push('\n');
                    }
                    Err(e) => text.push_str(&format!("❌ Failed to check {}: {e:#}\n\n", path.display())),
                }
            }
            text
        }
        OutputFormat::Json => {
            let entries = results
                .iter()
                .map(|(path, result)| match result {
                    Ok(record) => serde_json::to_value(record),
                    Err(e) => Ok(serde_json::json!({
                        "source": path.display().to_string(),
                        "error": format!("{e:#}"),
                    })),
                })
                .collect::<Result<Vec<_>, _>>()?;
            serde_json::to_string_pretty(&entries)?
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("💾 Report saved to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(all_ok)
}

fn load_model(path: &Path) -> Result<AcademicDocument> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
        Some("json") => serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display())),
        _ => Err(anyhow!(
            "Unsupported model format: {} (expected .yaml, .yml or .json)",
            path.display()
        )),
    }
}

/// Returns Ok(false) when the model has error-level issues.
fn run_generate(input: &Path, output: &Path, args: &ProfileArgs) -> Result<bool> {
    let profile = resolve_profile(args)?;
    let document = load_model(input)?;
    println!("📄 Model: {}", input.display());

    let issues = document.validate();
    if issues.is_empty() {
        println!("✅ Model is valid");
    }
    for issue in &issues {
        let icon = match issue.severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        println!("  {icon} {}", issue.message);
    }

    let written = AttributeDumpRenderer::new().render(&document, &profile.rule_set, output)?;
    println!("💾 Layout saved to: {}", written.display());

    let attrs = document.layout(&profile.rule_set);
    let report = ComplianceChecker::new(&profile)?.check(&attrs.page, &attrs.paragraphs);
    println!(
        "📊 Layout self-check: {}/100 ({}/{} checks passed)",
        report.score(),
        report.checks_passed(),
        report.total_checks()
    );

    Ok(!issues.iter().any(|i| i.severity == Severity::Error))
}

fn run_rules(args: &ProfileArgs) -> Result<bool> {
    let profile = resolve_profile(args)?;
    println!("📋 Profile: {} ({})", profile.name, profile.description);
    println!("{}", serde_yaml::to_string(&profile.rule_set)?);
    Ok(true)
}

fn run_profiles() -> Result<bool> {
    let manager = ProfileManager::new();

    println!("📋 Built-in profiles:");
    for profile in manager.profiles() {
        let marker = if profile.name == DEFAULT_PROFILE { " (default)" } else { "" };
        println!("  {:<14} {}{marker}", profile.name, profile.description);
    }

    match manager.user_dir() {
        Some(dir) => {
            println!("\n📁 User profiles in {}:", dir.display());
            let names = manager.user_profile_names()?;
            if names.is_empty() {
                println!("  (none)");
            }
            for name in names {
                println!("  {name}");
            }
        }
        None => println!("\n⚠️  No user config directory on this platform"),
    }

    Ok(true)
}
