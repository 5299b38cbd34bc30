//! `feed` keeps track of the feed stocked for each kind of animal.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
