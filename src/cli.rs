use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use polyrunner::{
    config::{ConfigError, HarnessConfig, parse_timeout},
    core::domain::Language,
};

#[derive(Parser, Debug)]
#[command(name = "polyrunner", version, about = "Compile and test solutions across languages")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run sources that are already on disk and print the ledger block
    Exec {
        #[arg(long, short)]
        language: Language,
        #[arg(long)]
        solution: PathBuf,
        #[arg(long)]
        test: Option<PathBuf>,
        /// Defaults to the solution's directory
        #[arg(long)]
        work_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        index: usize,
        #[arg(long, help = "Print passed/total instead of a boolean verdict")]
        stats: bool,
    },
    /// Lay out one problem instance, run it and append the verdict to a ledger
    Verify {
        #[arg(long, short)]
        language: Language,
        /// Language the solution was translated from; nests the output under `<from>_to_<language>`
        #[arg(long)]
        from_language: Option<Language>,
        #[arg(long)]
        solution_source: PathBuf,
        #[arg(long)]
        test_source: Option<PathBuf>,
        #[arg(long, help = "Treat the solution source as a raw model response")]
        from_response: bool,
        #[arg(long, env = "POLYRUNNER_OUT_DIR", default_value = "generated")]
        out_dir: PathBuf,
        #[arg(long)]
        index: usize,
        #[arg(long, env = "POLYRUNNER_LEDGER", default_value = "results.txt")]
        ledger: PathBuf,
        #[arg(long, help = "Append the tests to the solution in one entry file")]
        combined: bool,
        #[arg(long, help = "Record passed/total instead of a boolean verdict")]
        stats: bool,
    },
}

/// Per-invocation overrides on top of the environment configuration.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    #[arg(long, global = true)]
    pub python: Option<PathBuf>,
    #[arg(long, global = true)]
    pub javac: Option<PathBuf>,
    #[arg(long, global = true)]
    pub java: Option<PathBuf>,
    #[arg(long, global = true)]
    pub node: Option<PathBuf>,
    #[arg(long, global = true)]
    pub cxx: Option<PathBuf>,
    #[arg(long, global = true)]
    pub go: Option<PathBuf>,
    #[arg(long, global = true)]
    pub junit_jar: Option<PathBuf>,
    #[arg(long, global = true)]
    pub jest: Option<PathBuf>,
    /// Seconds, 0 disables the deadline
    #[arg(long, global = true)]
    pub compile_timeout: Option<String>,
    /// Seconds, 0 disables the deadline
    #[arg(long, global = true)]
    pub run_timeout: Option<String>,
}

impl Overrides {
    pub fn apply(&self, mut config: HarnessConfig) -> Result<HarnessConfig, ConfigError> {
        let paths = [
            (&self.python, &mut config.python),
            (&self.javac, &mut config.javac),
            (&self.java, &mut config.java),
            (&self.node, &mut config.node),
            (&self.cxx, &mut config.cxx),
            (&self.go, &mut config.go),
            (&self.junit_jar, &mut config.junit_jar),
            (&self.jest, &mut config.jest),
        ];
        for (value, slot) in paths {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        if let Some(value) = &self.compile_timeout {
            config.compile_timeout = parse_timeout("--compile-timeout", value)?;
        }
        if let Some(value) = &self.run_timeout {
            config.run_timeout = parse_timeout("--run-timeout", value)?;
        }
        Ok(config)
    }
}
