use std::panic;
use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use polyrunner::{
    config::HarnessConfig,
    constants::SYSTEM_ERROR_PREFIX,
    core::{
        domain::{ExecutionRequest, ExecutionResult, FailureKind},
        pipeline::Orchestrator,
    },
    layout::{
        self, LayoutStyle,
        extract::{split_marked_sections, strip_code_fence},
    },
    ledger::{Ledger, LedgerMode},
};

use crate::cli::{Cli, Command};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    set_panic_hook();

    let cli = Cli::parse();
    let config = cli.overrides.apply(HarnessConfig::from_env()?)?;
    tracing::debug!(?config, "configuration loaded");
    let orchestrator = Orchestrator::from_config(&config);

    match cli.command {
        Command::Exec {
            language,
            solution,
            test,
            work_dir,
            index,
            stats,
        } => {
            let mut request = ExecutionRequest::for_solution(language, solution);
            if let Some(test) = test {
                request = request.with_test(test);
            }
            if let Some(work_dir) = work_dir {
                request = request.with_work_dir(work_dir);
            }

            let result = orchestrator.execute(&request).await;
            print!("{}", Ledger::render(index, &result, ledger_mode(stats)));
        }
        Command::Verify {
            language,
            from_language,
            solution_source,
            test_source,
            from_response,
            out_dir,
            index,
            ledger,
            combined,
            stats,
        } => {
            let (solution, tests) =
                read_sources(&solution_source, test_source.as_deref(), from_response).await?;
            let out_dir = match from_language {
                Some(from) => layout::pair_dir(&out_dir, from, language),
                None => out_dir,
            };
            let style = if combined {
                LayoutStyle::Combined
            } else {
                LayoutStyle::Separate
            };

            let result =
                match layout::write(&out_dir, language, &solution, tests.as_deref(), style).await {
                    Ok(request) => orchestrator.execute(&request).await,
                    Err(e) => {
                        tracing::error!(index, error = %e, "cannot lay out problem instance");
                        ExecutionResult::compilation_failed(
                            format!("{SYSTEM_ERROR_PREFIX}{e}"),
                            String::new(),
                            0,
                            FailureKind::Fault,
                        )
                    }
                };

            let ledger = Ledger::new(&ledger, ledger_mode(stats));
            ledger.append(index, &result).await?;
            print!("{}", Ledger::render(index, &result, ledger_mode(stats)));
        }
    }

    Ok(())
}

fn ledger_mode(stats: bool) -> LedgerMode {
    if stats {
        LedgerMode::Stats
    } else {
        LedgerMode::Verdict
    }
}

/// Solution and test text. A raw response may carry both as marked sections;
/// an explicit test file takes precedence over a marked one.
async fn read_sources(
    solution_source: &Path,
    test_source: Option<&Path>,
    from_response: bool,
) -> Result<(String, Option<String>), std::io::Error> {
    let text = tokio::fs::read_to_string(solution_source).await?;
    let tests = match test_source {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };
    if !from_response {
        return Ok((text, tests));
    }

    let (marked_solution, marked_tests) = split_marked_sections(&text);
    let solution = if marked_solution.is_empty() {
        strip_code_fence(&text)
    } else {
        strip_code_fence(&marked_solution)
    };
    let tests = tests.or_else(|| {
        (!marked_tests.is_empty()).then(|| strip_code_fence(&marked_tests))
    });
    Ok((solution, tests))
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
