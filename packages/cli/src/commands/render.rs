use super::collect_templates;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use docweave_engine::{Engine, EngineConfig, FsResourceProvider, RunReport, UnknownCommandPolicy};
use docweave_model::{DataNode, ModelAccess};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file or directory (defaults to the configured source directory)
    pub template: Option<PathBuf>,

    /// JSON data file (overrides config)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Output file, or output directory when rendering a directory.
    /// A single template without this goes to stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Base directory for image and import resources (overrides config)
    #[arg(short, long)]
    pub resources: Option<PathBuf>,

    /// Abort on the first placeholder problem
    #[arg(long)]
    pub fail_fast: bool,

    /// What to do with unknown commands
    #[arg(long, value_enum)]
    pub unknown: Option<UnknownArg>,

    /// Write the run reports as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnknownArg {
    Ignore,
    Fail,
}

impl From<UnknownArg> for UnknownCommandPolicy {
    fn from(arg: UnknownArg) -> Self {
        match arg {
            UnknownArg::Ignore => UnknownCommandPolicy::Ignore,
            UnknownArg::Fail => UnknownCommandPolicy::Fail,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateReport {
    template: String,
    #[serde(flatten)]
    report: RunReport,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let engine_config = engine_config(&config, &args);

    let resource_dir = match &args.resources {
        Some(dir) => cwd.join(dir),
        None => config.get_resource_dir(cwd),
    };
    let engine = Engine::new(engine_config).with_resources(Arc::new(FsResourceProvider::new(resource_dir)));

    let data_file = args
        .data
        .as_ref()
        .map(|file| cwd.join(file))
        .or_else(|| config.get_data_file(cwd));
    let data = load_data(data_file.as_deref())?;

    let target = match &args.template {
        Some(path) => cwd.join(path),
        None => config.get_src_dir(cwd),
    };
    let templates = collect_templates(&target, &config.template_extension)?;

    let mut reports = Vec::new();
    if target.is_file() {
        let (text, report) = render_file(&engine, &target, &data)?;
        match &args.out {
            Some(out) => write_output(&cwd.join(out), &text)?,
            None => print!("{}", text),
        }
        print_problems(&report);
        reports.push(TemplateReport {
            template: target.display().to_string(),
            report,
        });
    } else {
        let out_dir = match &args.out {
            Some(out) => cwd.join(out),
            None => config.get_out_dir(cwd),
        };
        reports = render_directory(&engine, &target, &out_dir, &templates, &data)?;
    }

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&reports)?;
        write_output(&cwd.join(report_path), &json)?;
    }

    Ok(())
}

fn engine_config(config: &Config, args: &RenderArgs) -> EngineConfig {
    let mut engine_config = config.engine.clone();
    if args.fail_fast {
        engine_config.fail_fast = true;
    }
    if let Some(unknown) = args.unknown {
        engine_config.unknown_command = unknown.into();
    }
    engine_config
}

fn render_directory(
    engine: &Engine,
    src_dir: &Path,
    out_dir: &Path,
    templates: &[PathBuf],
    data: &DataNode,
) -> Result<Vec<TemplateReport>> {
    eprintln!("{}", "Rendering templates...".bright_blue().bold());

    if templates.is_empty() {
        eprintln!("{}", "No templates found".yellow());
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    let mut problem_count = 0;
    let mut error_count = 0;

    for template in templates {
        let relative_path = template.strip_prefix(src_dir).unwrap_or(template);
        let output_path = out_dir.join(relative_path);

        let rendered = render_file(engine, template, data)
            .and_then(|(text, report)| write_output(&output_path, &text).map(|_| report));
        match rendered {
            Ok(report) => {
                let mark = if report.is_clean() { "✓".green() } else { "!".yellow() };
                eprintln!("  {} {} → {}", mark, relative_path.display(), output_path.display());
                problem_count += report.problems.len();
                print_problems(&report);
                reports.push(TemplateReport {
                    template: relative_path.display().to_string(),
                    report,
                });
            }
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), relative_path.display(), format!("{:#}", e).red());
            }
        }
    }

    eprintln!();
    if error_count == 0 {
        eprintln!(
            "{} Rendered {} templates, {} problems",
            "Done".green().bold(),
            reports.len(),
            problem_count
        );
        Ok(reports)
    } else {
        Err(anyhow!(
            "{} of {} templates failed to render",
            error_count,
            templates.len()
        ))
    }
}

fn render_file(engine: &Engine, path: &Path, data: &DataNode) -> Result<(String, RunReport)> {
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut model = ModelAccess::new(data.clone());
    let (mut text, report) = engine
        .render_text(&source, &mut model)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    if source.ends_with('\n') {
        text.push('\n');
    }
    Ok((text, report))
}

fn load_data(path: Option<&Path>) -> Result<DataNode> {
    let Some(path) = path else {
        return Ok(DataNode::map());
    };
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read data file {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(DataNode::from(value))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn print_problems(report: &RunReport) {
    for problem in &report.problems {
        eprintln!("    {} {}", "warning:".yellow().bold(), problem);
    }
}
