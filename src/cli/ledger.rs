use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use structopt::StructOpt;

use utxo_config::config::{Config, StorageBackend};
use utxo_data_structures::{
    amount::Amount,
    chain::{Hash, Hashable, OwnerId},
    transaction_factory,
};
use utxo_ledger::{
    identity::{CreatorIdentity, IdentityResolver},
    invocation::{Invocation, Response},
    query::Query,
    Ledger,
};
use utxo_storage::{backends::btreemap, storage::Storage};

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Mint the initial supply to the caller.
    #[structopt(name = "genesis")]
    Genesis {
        /// Initial supply. Defaults to the configured `genesis.supply`.
        #[structopt(long = "supply")]
        supply: Option<Amount>,
    },
    /// Send value to an owner, consuming unspent transactions of the caller.
    #[structopt(name = "spend")]
    Spend {
        /// Owner identifier (hex) of the recipient.
        #[structopt(long = "to")]
        to: OwnerId,
        /// Amount sent to the recipient.
        #[structopt(long = "fee")]
        fee: Amount,
        /// Identifiers of the transactions to consume.
        #[structopt(name = "INPUT", required = true)]
        inputs: Vec<Hash>,
    },
    /// Query the ledger: Identify <id>, Unspent, Spent or All.
    #[structopt(name = "query")]
    Query {
        #[structopt(name = "MODE")]
        mode: String,
        #[structopt(name = "ID")]
        tx_id: Option<String>,
    },
    /// Print the owner identifier of the caller.
    #[structopt(name = "owner")]
    Owner,
    /// Apply the invocations of a JSON-lines file, in order.
    #[structopt(name = "replay")]
    Replay {
        #[structopt(name = "FILE")]
        file: PathBuf,
    },
}

/// One line of a replay file
#[derive(Debug, Deserialize)]
struct ReplayEntry {
    /// Credential of the caller, if any
    #[serde(default)]
    identity: Option<String>,
    /// Function name followed by its arguments, e.g. `["query", "Unspent"]`
    invocation: Vec<String>,
}

pub fn exec_cmd(command: Command, identity: &CreatorIdentity, config: &Config) -> anyhow::Result<()> {
    match config.storage.backend {
        StorageBackend::Memory => {
            let ledger = Ledger::new(btreemap::Backend::default());
            run(&ledger, command, identity, config)
        }
        StorageBackend::RocksDb => {
            let db = open_rocksdb(&config.storage.db_path)?;
            run(&Ledger::new(db), command, identity, config)
        }
    }
}

#[cfg(feature = "rocksdb-backend")]
fn open_rocksdb(path: &Path) -> anyhow::Result<utxo_storage::backends::rocksdb::Backend> {
    log::info!("Opening database at {}", path.display());

    utxo_storage::backends::rocksdb::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_rocksdb(path: &Path) -> anyhow::Result<btreemap::Backend> {
    anyhow::bail!(
        "Cannot open {}: the rocksdb storage backend requires building with the `rocksdb-backend` feature",
        path.display()
    )
}

fn run<S: Storage>(
    ledger: &Ledger<S>,
    command: Command,
    identity: &CreatorIdentity,
    config: &Config,
) -> anyhow::Result<()> {
    match command {
        Command::Genesis { supply } => {
            let caller = identity.resolve_caller_identity()?;
            let supply = supply.unwrap_or(config.genesis.supply);
            let genesis = transaction_factory::make_genesis(caller, supply);

            ledger.invoke(identity, Invocation::Genesis(genesis.to_bytes()?))?;
            println!("{}", genesis.hash());
        }
        Command::Spend { to, fee, inputs } => {
            let input_txs = inputs
                .iter()
                .map(|tx_id| ledger.transaction(tx_id))
                .collect::<Result<Vec<_>, _>>()?;
            let (candidate, change) = transaction_factory::make_spend(to, fee, &input_txs)?;
            log::info!("Sending {} to {}, expected change {}", fee, to, change);

            let response = ledger.invoke(identity, Invocation::Spend(candidate.to_bytes()?))?;
            println!("{}", candidate.hash());
            print_response(&response);
        }
        Command::Query { mode, tx_id } => {
            let query = Query::from_mode(&mode, tx_id.as_deref())?;
            let response = ledger.invoke(identity, Invocation::Query(query))?;
            print_response(&response);
        }
        Command::Owner => {
            println!("{}", identity.resolve_caller_identity()?);
        }
        Command::Replay { file } => replay(ledger, &file)?,
    }

    Ok(())
}

/// Apply every line of `path`. Failed invocations are reported and do not stop the replay.
fn replay<S: Storage>(ledger: &Ledger<S>, path: &Path) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut failures = 0;

    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayEntry = serde_json::from_str(&line)
            .with_context(|| format!("Invalid replay entry at line {}", n + 1))?;
        let identity = match entry.identity {
            Some(name) => CreatorIdentity::new(name),
            None => CreatorIdentity::anonymous(),
        };

        let result = Invocation::from_args(&entry.invocation)
            .and_then(|invocation| ledger.invoke(&identity, invocation));
        match result {
            Ok(response) => print_response(&response),
            Err(e) => {
                failures += 1;
                println!("line {}: {}", n + 1, e);
            }
        }
    }

    if ledger.skipped_index_entries() > 0 {
        log::warn!(
            "Skipped {} malformed spent-state entries",
            ledger.skipped_index_entries()
        );
    }
    log::info!("Replay finished with {} failed invocations", failures);

    Ok(())
}

fn print_response(response: &Response) {
    match response.payload() {
        Some(payload) => println!("{}", String::from_utf8_lossy(payload)),
        None => println!("OK"),
    }
}
