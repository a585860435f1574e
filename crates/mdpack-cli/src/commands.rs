use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use mdpack_sdk::{
    ArchiveSummary, AssemblyReport, Detection, Packager, PackagerConfig, PlanOutcome, PlanReport,
    RunOutcome,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let (config, base_dir) = load_config(&cli)?;
    let packager = Packager::new(config, &base_dir)?;

    let work = dispatch(&packager, cli.command);
    match cli.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), work)
            .await
            .map_err(|_| anyhow!("timed out after {secs}s; nothing committed"))?,
        None => work.await,
    }
}

/// Configuration from the `--config` file with command-line overrides.
/// Relative paths resolve against the configuration file's directory.
pub fn load_config(cli: &Cli) -> anyhow::Result<(PackagerConfig, PathBuf)> {
    let mut config = PackagerConfig::from_package_json(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(version) = cli.api_version {
        config.api_version = version;
    }
    if let Some(project) = &cli.project {
        config.project_base_directory = project.clone();
    }
    if let Some(output) = &cli.output {
        config.output_directory = output.clone();
    }
    if let Some(archive) = &cli.archive {
        config.output_package_zip = archive.clone();
    }

    let base_dir = match cli.config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((config, base_dir))
}

async fn dispatch(packager: &Packager, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Reset => cmd_reset(packager),
        Command::Package(args) => cmd_package(packager, args),
        Command::Zip => cmd_zip(packager).await,
        Command::Commit => cmd_commit(packager),
        Command::MockResources => cmd_mock_resources(packager),
        Command::Run(args) => cmd_run(packager, args).await,
    }
}

fn cmd_reset(packager: &Packager) -> anyhow::Result<()> {
    packager.reset_all()?;
    println!(
        "{} Reset {}",
        "✓".green().bold(),
        packager.output_root().display().to_string().bold()
    );
    Ok(())
}

fn cmd_package(packager: &Packager, args: PackageArgs) -> anyhow::Result<()> {
    let (detection, report) = match packager.detect_and_plan(args.all)? {
        PlanOutcome::NoChanges(detection) => return no_changes(packager, &detection),
        PlanOutcome::Planned { detection, report } => (detection, report),
    };
    print_detection(&detection);
    print_skipped(&report);

    let assembly = packager.assemble(&report.plan)?;
    let mocked = packager.mock_resources()?;
    print_assembly(packager, &assembly, mocked.len());
    Ok(())
}

async fn cmd_zip(packager: &Packager) -> anyhow::Result<()> {
    let archive = packager.write_archive().await?;
    print_archive(&archive);
    Ok(())
}

fn cmd_commit(packager: &Packager) -> anyhow::Result<()> {
    packager.commit()?;
    println!("{} Fingerprints committed", "✓".green().bold());
    Ok(())
}

fn cmd_mock_resources(packager: &Packager) -> anyhow::Result<()> {
    let mocked = packager.mock_resources()?;
    if mocked.is_empty() {
        println!("No mock resources configured.");
    }
    for path in &mocked {
        println!("  {} {}", "mocked:".cyan(), path.display());
    }
    Ok(())
}

async fn cmd_run(packager: &Packager, args: RunArgs) -> anyhow::Result<()> {
    let summary = match packager.run(args.all, args.commit).await? {
        RunOutcome::NoChanges(detection) => return no_changes(packager, &detection),
        RunOutcome::Packaged(summary) => summary,
    };
    print_detection(&summary.detection);
    print_skipped(&summary.report);
    print_assembly(packager, &summary.assembly, summary.mocked.len());
    print_archive(&summary.archive);
    if summary.committed {
        println!("{} Fingerprints committed", "✓".green().bold());
    }
    Ok(())
}

fn no_changes(packager: &Packager, detection: &Detection) -> anyhow::Result<()> {
    print_failures(detection);
    if packager.config().force_package_continue_silent {
        println!("No changes ({} artifacts checked).", detection.visited);
        Ok(())
    } else {
        bail!("no changes to package ({} artifacts checked)", detection.visited)
    }
}

fn print_detection(detection: &Detection) {
    println!(
        "{} {} of {} artifacts selected",
        "●".cyan(),
        detection.change_set.len().to_string().bold(),
        detection.visited
    );
    for artifact in detection.change_set.iter() {
        println!("  {} {}", "changed:".green(), artifact);
    }
    print_failures(detection);
}

fn print_failures(detection: &Detection) {
    for failure in &detection.failures {
        println!("  {} {} ({})", "unreadable:".red(), failure.path, failure.reason);
    }
}

fn print_skipped(report: &PlanReport) {
    for skipped in &report.skipped {
        println!("  {} {} ({})", "skipped:".yellow(), skipped.artifact, skipped.reason);
    }
}

fn print_assembly(packager: &Packager, assembly: &AssemblyReport, mocked: usize) {
    println!(
        "{} Assembled {} artifacts into {}",
        "✓".green().bold(),
        assembly.artifacts.to_string().bold(),
        display(packager.staging_root())
    );
    println!(
        "  descriptors: {} copied, {} generated; mocks: {}",
        assembly.companions_copied, assembly.companions_synthesized, mocked
    );
}

fn print_archive(archive: &ArchiveSummary) {
    println!(
        "{} Wrote {} ({} files, {} bytes)",
        "✓".green().bold(),
        display(&archive.path),
        archive.files,
        archive.bytes
    );
}

fn display(path: &Path) -> colored::ColoredString {
    path.display().to_string().blue()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("package.json");
        fs::write(
            &config_path,
            r#"{"forceDeveloperConfig": {"apiVersion": 40, "outputDirectory": "out"}}"#,
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();

        let cli = parse(&["mdpack", "reset", "--config", config_arg, "--api-version", "58"]);
        let (config, base) = load_config(&cli).unwrap();
        assert_eq!(config.api_version, 58);
        assert_eq!(config.output_directory, PathBuf::from("out"));
        assert_eq!(base, dir.path());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("absent.json");
        let cli = parse(&["mdpack", "zip", "--config", config_path.to_str().unwrap()]);
        let (config, _) = load_config(&cli).unwrap();
        assert_eq!(config, PackagerConfig::default());
    }

    #[test]
    fn bare_config_name_resolves_against_cwd() {
        let cli = parse(&["mdpack", "zip", "--config", "does-not-exist.json"]);
        let (_, base) = load_config(&cli).unwrap();
        assert_eq!(base, PathBuf::from("."));
    }

    #[tokio::test]
    async fn no_changes_fails_unless_silent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("project/classes")).unwrap();
        let config_path = dir.path().join("package.json");
        let config_arg = config_path.to_str().unwrap().to_string();

        let cli = parse(&["mdpack", "run", "--config", &config_arg]);
        assert!(run_command(cli).await.is_err());

        fs::write(
            &config_path,
            r#"{"forceDeveloperConfig": {"forcePackageContinueSilent": true}}"#,
        )
        .unwrap();
        let cli = parse(&["mdpack", "run", "--config", &config_arg]);
        run_command(cli).await.unwrap();
    }

    #[tokio::test]
    async fn run_then_commit_round() {
        let dir = tempfile::tempdir().unwrap();
        let class = dir.path().join("project/classes/Foo.cls");
        fs::create_dir_all(class.parent().unwrap()).unwrap();
        fs::write(&class, "public class Foo {}").unwrap();
        let config_arg = dir.path().join("package.json").to_str().unwrap().to_string();

        run_command(parse(&["mdpack", "run", "--commit", "--config", &config_arg]))
            .await
            .unwrap();
        assert!(dir.path().join(".package/package.zip").is_file());

        // Unchanged tree: nothing to package.
        assert!(run_command(parse(&["mdpack", "run", "--config", &config_arg]))
            .await
            .is_err());
    }
}
