use std::{env, path::PathBuf};

use anyhow::Context;
use structopt::StructOpt;

use utxo_config as config;
use utxo_ledger::identity::CreatorIdentity;

mod ledger;

pub fn from_args() -> Cli {
    Cli::from_args()
}

pub fn exec(command: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        debug,
        trace,
        identity,
        cmd,
    } = command;

    let config = get_config(config)?;

    let mut log_opts = LogOptions {
        level: config.log.level,
        source: LogOptionsSource::Config,
    };
    if env::var("RUST_LOG").is_ok() {
        log_opts.source = LogOptionsSource::Env;
    }
    if trace {
        log_opts.level = log::LevelFilter::Trace;
        log_opts.source = LogOptionsSource::Flag;
    } else if debug {
        log_opts.level = log::LevelFilter::Debug;
        log_opts.source = LogOptionsSource::Flag;
    }
    init_logger(log_opts);

    let identity = match identity {
        Some(name) => CreatorIdentity::new(name),
        None => CreatorIdentity::anonymous(),
    };

    ledger::exec_cmd(cmd, &identity, &config)
}

fn init_logger(opts: LogOptions) {
    let mut builder = match opts.source {
        LogOptionsSource::Env => env_logger::Builder::from_default_env(),
        LogOptionsSource::Config | LogOptionsSource::Flag => {
            let mut builder = env_logger::Builder::new();
            builder
                .filter_level(log::LevelFilter::Warn)
                .filter_module("utxo", opts.level);
            builder
        }
    };
    builder.init();

    log::debug!("Log level set to {} from {:?}", opts.level, opts.source);
}

fn get_config(path: Option<PathBuf>) -> anyhow::Result<config::config::Config> {
    match path {
        Some(p) => {
            let partial = config::loaders::toml::from_file(&p)
                .with_context(|| format!("Failed to load config from {}", p.display()))?;

            Ok(config::config::Config::from_partial(&partial))
        }
        None => Ok(config::config::Config::default()),
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "utxo", about = "Unspent-transaction-output ledger.")]
pub struct Cli {
    /// Load configuration from this TOML file. The default configuration is used otherwise.
    #[structopt(short = "c", long = "config")]
    config: Option<PathBuf>,
    /// Turn on DEBUG logging.
    #[structopt(long = "debug")]
    debug: bool,
    /// Turn on TRACE logging.
    #[structopt(long = "trace")]
    trace: bool,
    /// Credential of the caller. Its SHA-256 digest is the caller's owner identifier.
    #[structopt(short = "i", long = "identity")]
    identity: Option<String>,
    #[structopt(subcommand)]
    cmd: ledger::Command,
}

struct LogOptions {
    level: log::LevelFilter,
    source: LogOptionsSource,
}

#[derive(Debug)]
enum LogOptionsSource {
    Config,
    Env,
    Flag,
}
