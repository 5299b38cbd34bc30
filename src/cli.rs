use std::path::PathBuf;

mod check;
mod interactive;
mod list;
mod terminal;

use check::Check;
use clap::ArgAction;
use feedstock::{LoadError, MemoryPreferences, Preferences, Session, TomlPreferences};
use interactive::Interactive;
use list::List;
use terminal::Colorize;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The preferences file remembering the last used animal file
    #[arg(long, default_value = ".feedstock.toml", global = true)]
    prefs: PathBuf,

    /// Keep preferences in memory only
    #[arg(long, global = true)]
    no_prefs: bool,

    /// Open this animal file instead of the remembered one
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let command = self
            .command
            .unwrap_or_else(|| Command::Interactive(Interactive::default()));

        if self.no_prefs {
            command.run(MemoryPreferences::new(), self.file)
        } else {
            let prefs = TomlPreferences::open(&self.prefs)?;
            command.run(prefs, self.file)
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Edit the records through a menu (default)
    Interactive(Interactive),

    /// Print the records of the current file
    List(List),

    /// Check that an animal file can be loaded
    Check(Check),
}

impl Command {
    fn run<P: Preferences>(self, prefs: P, file: Option<PathBuf>) -> anyhow::Result<()> {
        match self {
            Self::Interactive(_) => Interactive::run(open_session(prefs, file)?)?,
            Self::List(command) => command.run(&open_session(prefs, file)?)?,
            Self::Check(command) => command.run()?,
        }
        Ok(())
    }
}

/// Starts a session, then switches to `file` if one was given.
fn open_session<P: Preferences>(prefs: P, file: Option<PathBuf>) -> anyhow::Result<Session<P>> {
    let (mut session, warning) = Session::start(prefs);
    if let Some(warning) = warning {
        eprintln!("{}", format!("⚠️  {warning}: {}", warning.source).warning());
    }

    if let Some(file) = file {
        match session.open(&file) {
            Ok(()) => {}
            Err(LoadError::NotFound) => {
                anyhow::bail!("No animal file at {}", file.display())
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Could not load data from file {}", file.display())));
            }
        }
    }

    Ok(session)
}
