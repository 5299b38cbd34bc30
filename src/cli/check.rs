use std::path::{Path, PathBuf};

use clap::Parser;
use feedstock::{storage, AnimalRecord, LoadError};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check that an animal file can be loaded")]
pub struct Check {
    /// The animal file to check
    path: PathBuf,
}

impl Check {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn run(self) -> anyhow::Result<()> {
        let records = load_checked(&self.path)?;
        let reorders = records.iter().filter(|r| r.needs_reorder()).count();

        println!(
            "{}",
            format!(
                "✅ {} holds {} animal record(s)",
                self.path.display(),
                records.len()
            )
            .success()
        );
        if reorders > 0 {
            println!("{}", format!("   {reorders} flagged for reorder").warning());
        }
        Ok(())
    }
}

fn load_checked(path: &Path) -> anyhow::Result<Vec<AnimalRecord>> {
    match storage::load(path) {
        Ok(records) => Ok(records),
        Err(LoadError::NotFound) => anyhow::bail!("No animal file at {}", path.display()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Could not load data from file {}", path.display()))),
    }
}
