use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::store;

#[derive(Args)]
pub struct ExportArgs {
    /// Write the backup here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Backup file to restore
    pub input: PathBuf,
}

/// Create a fresh state file with the default configuration.
pub fn run_init(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if file.exists() {
        return Err(format!("'{}' already exists", file.display()).into());
    }
    let mut store = store::FileStore::open(file)?;
    let coop = coop_finance_core::Cooperative::new();
    store::save(&coop, &mut store)?;
    println!("Initialized {}", file.display());
    Ok(())
}

pub fn run_export(args: ExportArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    let json = serde_json::to_string_pretty(&coop.export_backup())?;
    match args.output {
        Some(path) => {
            fs::write(&path, json)
                .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;
            println!("Backup written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn run_import(args: ImportArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let json = fs::read_to_string(&args.input)
        .map_err(|e| format!("Failed to read '{}': {e}", args.input.display()))?;
    coop.import_backup(&json)?;
    store::save(&coop, &mut store)?;
    println!("Backup restored from {}", args.input.display());
    Ok(())
}
