use clap::Parser;
use middleware_probe::utils::error::{ErrorSeverity, ProbeError};
use middleware_probe::utils::logger;
use middleware_probe::{ProbeCli, ProbeCommand, ProbeEngine, ProbeFile, ProbeReport};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() {
    let cli = ProbeCli::parse();
    logger::init_cli_logger(cli.debug);
    tracing::debug!("CLI arguments: {:?}", cli);

    let deadline = cli.deadline;
    let outcome = match cli.command {
        ProbeCommand::File(args) => run_file(&args.config).await,
        command => match command.into_target() {
            Some((target, eager_write)) => {
                let engine = ProbeEngine::new(deadline).with_eager_write(eager_write);
                let report = engine.run(target).await;
                report.to_json().map_err(ProbeError::from)
            }
            None => Err(ProbeError::ConfigError {
                message: "no probe target".to_string(),
            }),
        },
    };

    match outcome {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(
                "Probe run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

/// Runs every backend listed in the file, one after another.
async fn run_file(path: &std::path::Path) -> Result<String, ProbeError> {
    let file = ProbeFile::from_file(path)?;
    tracing::info!("Loaded probe file {}", path.display());

    let engine = ProbeEngine::new(file.probe.deadline).with_eager_write(file.probe.eager_write);
    let mut reports: BTreeMap<&'static str, ProbeReport> = BTreeMap::new();
    for target in file.targets() {
        let family = target.family();
        reports.insert(family.as_str(), engine.run(target).await);
    }

    Ok(serde_json::to_string(&reports)?)
}
