use super::collect_templates;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use docweave_engine::CommandRegistry;
use docweave_parser::{format_errors, parse_payload, Delimiters, ParseError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Template file or directory (defaults to the configured source directory)
    pub template: Option<PathBuf>,
}

/// Findings for one template
#[derive(Debug, Default)]
struct CheckOutcome {
    placeholders: Vec<(usize, String)>,
    parse_errors: Vec<ParseError>,
    warnings: Vec<String>,
}

impl CheckOutcome {
    fn is_clean(&self) -> bool {
        self.parse_errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let target = match &args.template {
        Some(path) => cwd.join(path),
        None => config.get_src_dir(cwd),
    };
    let templates = collect_templates(&target, &config.template_extension)?;
    let delimiters = config.engine.delimiters();
    let registry = CommandRegistry::builtin();

    eprintln!("{}", "Checking templates...".bright_blue().bold());

    let mut failed = 0;
    for template in &templates {
        let source =
            fs::read_to_string(template).with_context(|| format!("Failed to read {}", template.display()))?;
        let outcome = check_source(&source, &delimiters, |name| registry.contains(name));
        debug!(
            template = %template.display(),
            placeholders = outcome.placeholders.len(),
            "checked"
        );

        let display = template.strip_prefix(cwd).unwrap_or(template).display().to_string();
        let mark = if outcome.is_clean() { "✓".green() } else { "✗".red() };
        eprintln!("  {} {} ({} placeholders)", mark, display, outcome.placeholders.len());
        for (line, placeholder) in &outcome.placeholders {
            println!("{}:{}: {}", display, line, placeholder);
        }
        for warning in &outcome.warnings {
            eprintln!("    {} {}", "warning:".yellow().bold(), warning);
        }
        if !outcome.parse_errors.is_empty() {
            eprint!("{}", format_errors(&source, &display, &outcome.parse_errors));
        }
        if !outcome.is_clean() {
            failed += 1;
        }
    }

    eprintln!();
    if failed == 0 {
        eprintln!("{} {} templates look fine", "Done".green().bold(), templates.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} templates have problems", failed, templates.len()))
    }
}

/// Parse every marker of `source` and check that block commands pair up.
///
/// Markers inside `Ignore` regions are listed but not checked. Aliases
/// defined by `Alias` markers count as known from then on.
fn check_source(source: &str, delimiters: &Delimiters, is_known: impl Fn(&str) -> bool) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let mut open_blocks: Vec<(&'static str, usize)> = Vec::new();
    let mut aliases: HashMap<String, String> = HashMap::new();
    let mut ignoring = false;
    let mut offset = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let line_number = index + 1;
        for marker in delimiters.find_markers(line) {
            let raw = &line[marker.range.clone()];
            outcome.placeholders.push((line_number, raw.to_string()));

            let payload = match parse_payload(marker.payload_str(line)) {
                Ok(payload) => payload,
                Err(_) if ignoring => continue,
                Err(e) => {
                    outcome.parse_errors.push(e.shifted(offset + marker.payload.start));
                    continue;
                }
            };

            for command in &payload.commands {
                let resolved = aliases.get(&command.name).unwrap_or(&command.name).clone();
                let name = resolved.as_str();
                if ignoring {
                    ignoring = name != "EndIgnore";
                    continue;
                }
                if !is_known(name) {
                    outcome
                        .warnings
                        .push(format!("line {}: unknown command `{}`", line_number, name));
                }
                match name {
                    "For" => open_blocks.push(("EndFor", line_number)),
                    "If" => open_blocks.push(("EndIf", line_number)),
                    "Ignore" => ignoring = true,
                    "Alias" => {
                        if let (Some(key), Some(target)) =
                            (command.str_param("key"), command.str_param("replaceKey"))
                        {
                            aliases.insert(key.to_string(), target.to_string());
                        }
                    }
                    "EndIgnore" => outcome
                        .warnings
                        .push(format!("line {}: `EndIgnore` without `Ignore`", line_number)),
                    "EndFor" | "EndIf" => match open_blocks.pop() {
                        Some((expected, _)) if expected == name => {}
                        Some((expected, opened)) => outcome.warnings.push(format!(
                            "line {}: `{}` closes the block opened on line {}, expected `{}`",
                            line_number, name, opened, expected
                        )),
                        None => outcome
                            .warnings
                            .push(format!("line {}: `{}` without an opening block", line_number, name)),
                    },
                    _ => {}
                }
            }
        }
        offset += line.len();
    }

    for (expected, opened) in open_blocks {
        outcome
            .warnings
            .push(format!("line {}: block is never closed with `{}`", opened, expected));
    }
    outcome
}
