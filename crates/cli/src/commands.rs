//! Command implementations
//!
//! Each command loads its inputs, calls into the library crates and prints
//! a coloured report. Errors carry the path or step that failed.

use anyhow::Context;
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};
use tagforge_audit::{AnalysisResult, Priority, RuleEngine};
use tagforge_codegen::{ServerSideGenerator, StaticCatalog, patch_client_container};
use tagforge_core::Severity;
use tagforge_ir::{
    ContainerModel, MigrationAnalysis, Vendor, load_analysis, load_container, save_json,
};

use crate::config::TagforgeConfig;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub container: PathBuf,
    pub json: bool,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub container: PathBuf,
    pub output: PathBuf,
    pub analysis: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub vendors: Vec<Vendor>,
    pub transport_url: Option<String>,
    pub client_output: Option<PathBuf>,
    pub json: bool,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<TagforgeConfig> {
    TagforgeConfig::load_optional(path).context("Failed to load configuration")
}

fn open_container(path: &Path) -> anyhow::Result<ContainerModel> {
    load_container(path).with_context(|| format!("Failed to load container '{}'", path.display()))
}

// ============================================================================
// analyze
// ============================================================================

pub fn analyze(config: &TagforgeConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let model = open_container(&args.container)?;
    let result = run_analysis(config, args, &model);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result));
    }
    Ok(())
}

/// Audit a loaded container with file configuration and flag overrides
pub fn run_analysis(config: &TagforgeConfig, args: &AnalyzeArgs, model: &ContainerModel) -> AnalysisResult {
    let mut audit = config.audit.clone();
    for rule in &args.enable {
        audit = audit.enable_rule(rule);
    }
    for rule in &args.disable {
        audit = audit.disable_rule(rule.clone());
    }
    RuleEngine::new(audit).analyze(model)
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue(),
    }
}

fn score_label(score: u8) -> ColoredString {
    let text = format!("{:>3}", score);
    match score {
        80..=100 => text.green(),
        50..=79 => text.yellow(),
        _ => text.red(),
    }
}

/// Human-readable audit report
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(&format!("{}\n", "Scores".bold()));
    out.push_str(&format!("  {:<24} {}\n", "overall", score_label(result.scores.overall)));
    for (name, score) in result.scores.categories() {
        out.push_str(&format!("  {:<24} {}\n", name, score_label(score)));
    }
    out.push_str(&format!(
        "  {:<24} {}\n",
        "server-side readiness",
        score_label(result.scores.server_side_readiness)
    ));

    out.push_str(&format!(
        "\n{} ({} errors, {} warnings, {} info)\n",
        "Issues".bold(),
        result.count(Severity::Error),
        result.count(Severity::Warning),
        result.count(Severity::Info),
    ));
    if result.issues.is_empty() {
        out.push_str(&format!("  {}\n", "No issues found".green()));
    }
    for issue in &result.issues {
        out.push_str(&format!(
            "  [{}] {} {}\n",
            severity_label(issue.severity),
            issue.rule_id.dimmed(),
            issue.message
        ));
    }

    if !result.suggestions.is_empty() {
        out.push_str(&format!("\n{}\n", "Suggestions".bold()));
        for suggestion in &result.suggestions {
            let priority = match suggestion.priority {
                Priority::High => "high".red(),
                Priority::Medium => "medium".yellow(),
                Priority::Low => "low".normal(),
            };
            out.push_str(&format!("  [{}] {}\n", priority, suggestion.title.bold()));
            out.push_str(&format!("         {}\n", suggestion.description));
        }
    }

    out
}

// ============================================================================
// generate
// ============================================================================

pub fn generate(config: &TagforgeConfig, args: &GenerateArgs) -> anyhow::Result<()> {
    let model = open_container(&args.container)?;

    let analysis = match &args.analysis {
        Some(path) => load_analysis(path)
            .with_context(|| format!("Failed to load migration analysis '{}'", path.display()))?,
        None => MigrationAnalysis::from_container(&model),
    };

    let catalog = match &args.catalog {
        Some(path) => StaticCatalog::load(path)
            .with_context(|| format!("Failed to load template catalogue '{}'", path.display()))?,
        None => StaticCatalog::new(),
    };

    let mut generator_config = config.generator.clone();
    if !args.vendors.is_empty() {
        generator_config.vendors = args.vendors.clone();
    }
    if let Some(url) = &args.transport_url {
        generator_config.transport_url = Some(url.clone());
    }

    let generator = ServerSideGenerator::new(generator_config, catalog);
    let output = generator.generate(&model, &analysis);

    output
        .write_export(&args.output)
        .with_context(|| format!("Failed to write server container '{}'", args.output.display()))?;

    if let Some(path) = &args.client_output {
        let patched = generator.generate_modified_client_container(&model);
        save_json(&patched, path)
            .with_context(|| format!("Failed to write client container '{}'", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(output.summary())?);
        return Ok(());
    }

    let summary = output.summary();
    print!("{}", summary.display());

    if !summary.placeholders.is_empty() {
        println!("\n{}", "Replace these placeholder values:".yellow().bold());
        for placeholder in &summary.placeholders {
            println!("  {} = {}", placeholder.name, placeholder.placeholder.dimmed());
        }
    }
    if summary.has_warnings() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &summary.warnings {
            println!("  {}", warning);
        }
    }

    println!("\n{} {}", "✓".green().bold(), args.output.display());
    if let Some(path) = &args.client_output {
        println!("{} {}", "✓".green().bold(), path.display());
    }
    Ok(())
}

// ============================================================================
// patch-client
// ============================================================================

pub fn patch_client(
    config: &TagforgeConfig,
    container: &Path,
    output: &Path,
    transport_url: Option<&str>,
) -> anyhow::Result<()> {
    let model = open_container(container)?;

    let mut generator_config = config.generator.clone();
    if let Some(url) = transport_url {
        generator_config.transport_url = Some(url.to_string());
    }
    let url = generator_config.transport_url_or_placeholder();

    let patched = patch_client_container(model.raw(), url);
    save_json(&patched, output)
        .with_context(|| format!("Failed to write client container '{}'", output.display()))?;

    println!("{} {} (transport URL {})", "✓".green().bold(), output.display(), url);
    Ok(())
}

// ============================================================================
// info
// ============================================================================

pub fn info(container: &Path) -> anyhow::Result<()> {
    let model = open_container(container)?;
    print!("{}", render_info(&model));
    Ok(())
}

/// Container overview
pub fn render_info(model: &ContainerModel) -> String {
    let mut out = String::with_capacity(512);
    let name = model.container_name().unwrap_or("(unnamed container)");

    out.push_str(&format!("{}\n", name.bold()));
    out.push_str(&format!("  Tags:       {}\n", model.tags().len()));
    out.push_str(&format!("  Triggers:   {}\n", model.triggers().len()));
    out.push_str(&format!("  Variables:  {}\n", model.variables().len()));
    out.push_str(&format!("  Folders:    {}\n", model.folders().len()));
    out.push_str(&format!("  Clients:    {}\n", model.clients().len()));
    out.push_str(&format!("  Templates:  {}\n", model.templates().len()));
    if model.skipped_entities() > 0 {
        out.push_str(&format!(
            "  {}\n",
            format!("{} entities could not be decoded", model.skipped_entities()).yellow()
        ));
    }

    let analysis = MigrationAnalysis::from_container(model);
    let vendors: Vec<String> = Vendor::all()
        .iter()
        .map(|v| (v, analysis.tags_for(*v).count()))
        .filter(|(_, count)| *count > 0)
        .map(|(v, count)| format!("{} ({})", v.display_name(), count))
        .collect();
    if vendors.is_empty() {
        out.push_str("  Vendors:    none detected\n");
    } else {
        out.push_str(&format!("  Vendors:    {}\n", vendors.join(", ")));
    }

    out
}

// ============================================================================
// Tests
// ============================================================================
