//! Command handlers for the CLI.
//!
//! Handlers print results to stdout and log progress through `tracing`.
//! Per-file failures in multi-file commands are reported and counted rather
//! than aborting the run; the command fails at the end if any file failed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use siteprofile_core::{
    load_profile, parse_analysis_response, save_profile, LoadError, ProfileRegistry, SiteProfile,
    ValidationOptions,
};

/// Validate each file, printing one line per file.
pub(crate) fn run_validate(paths: &[PathBuf], options: ValidationOptions) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for path in paths {
        match load_profile(path, options) {
            Ok(profile) => {
                println!(
                    "ok      {} ({} locators)",
                    path.display(),
                    profile.locators().len()
                );
            }
            Err(error) => {
                failed += 1;
                println!("invalid {}: {}", path.display(), describe_failure(&error));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} profiles failed validation", paths.len());
    }
    Ok(())
}

pub(crate) fn run_show(path: &Path, json: bool, options: ValidationOptions) -> anyhow::Result<()> {
    let profile = load_profile(path, options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", summarize(&profile));
    }
    Ok(())
}

pub(crate) fn run_list(dir: &Path, options: ValidationOptions) -> anyhow::Result<()> {
    let mut registry = ProfileRegistry::new();
    let report = registry
        .load_dir(dir, options)
        .with_context(|| format!("failed to scan profile directory {}", dir.display()))?;

    for profile in registry.iter() {
        println!(
            "{:<48} {:>3} locators {:>2} popups",
            profile.url(),
            profile.locators().len(),
            profile.elements().popups().len()
        );
    }
    for (path, error) in &report.failures {
        println!("invalid {}: {}", path.display(), describe_failure(error));
    }

    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} profiles in {} failed to load",
            report.failures.len(),
            report.failures.len() + report.loaded.len(),
            dir.display()
        );
    }
    Ok(())
}

pub(crate) fn run_import(
    response: &Path,
    dir: &Path,
    options: ValidationOptions,
) -> anyhow::Result<()> {
    let written = import_response(response, dir, options)?;
    println!("saved {}", written.display());
    Ok(())
}

/// Parse the analysis response in `response` and store the profile under `dir`.
pub(crate) fn import_response(
    response: &Path,
    dir: &Path,
    options: ValidationOptions,
) -> anyhow::Result<PathBuf> {
    let text = std::fs::read_to_string(response)
        .with_context(|| format!("failed to read analysis response {}", response.display()))?;
    let profile = parse_analysis_response(&text, options)
        .map_err(|e| anyhow::anyhow!(describe_failure(&e)))
        .with_context(|| format!("no usable profile in {}", response.display()))?;

    tracing::info!(url = profile.url(), "imported site profile");
    Ok(save_profile(dir, &profile)?)
}

/// One-line failure description; validation failures include the reason code.
pub(crate) fn describe_failure(error: &LoadError) -> String {
    match error.validation() {
        Some(v) => format!("[{}] {v}", v.code()),
        None => error.to_string(),
    }
}

/// Human-readable multi-line summary of a profile.
pub(crate) fn summarize(profile: &SiteProfile) -> String {
    let elements = profile.elements();
    let mut lines = vec![format!("url:       {}", profile.url())];

    if let Some(ts) = profile.timestamp() {
        lines.push(format!("captured:  {}", ts.date()));
    }

    let banner = yes_no(elements.has_cookie_banner());
    lines.push(match elements.cookies() {
        Some(cookies) => {
            let c = cookies.choices();
            format!(
                "cookies:   banner {banner}; marketing {}, analytics {}, functional {}",
                yes_no(c.marketing),
                yes_no(c.analytics),
                yes_no(c.functional)
            )
        }
        None => format!("cookies:   banner {banner}"),
    });
    if let Some(product) = elements.product() {
        lines.push(format!("product:   {}", product.url()));
    }

    lines.push("locators:".to_owned());
    for (path, locator) in profile.locators_by_priority() {
        let priority = locator
            .priority()
            .map_or_else(|| "-".to_owned(), |p| p.to_string());
        let fallbacks = locator.selectors().secondary().len()
            + usize::from(locator.selectors().xpath().is_some());
        lines.push(format!(
            "  [{priority}] {path} {} {} (+{fallbacks} fallbacks)",
            locator.element_type(),
            locator.selectors().primary()
        ));
    }

    for (i, popup) in elements.popups().iter().enumerate() {
        lines.push(format!("popup {i}:   trigger: {}", popup.trigger()));
    }

    if !profile.notes().is_empty() {
        lines.push("notes:".to_owned());
        lines.extend(profile.notes().iter().map(|note| format!("  - {note}")));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
