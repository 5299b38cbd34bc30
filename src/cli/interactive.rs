use std::{
    cell::Cell,
    fmt,
    path::{Path, PathBuf},
    rc::Rc,
};

use chrono::NaiveDate;
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use feedstock::{
    domain::{date, REORDER_CHOICES},
    AnimalRecord, FieldError, LoadError, Preferences, RawRecord, RecordValidator, SaveError,
    SaveOutcome, Session, StoreError, ValidationErrors,
};
use tracing::instrument;

use super::{list::print_table, terminal::Colorize};

#[derive(Debug, Default, Parser)]
#[command(about = "Edit the animal records through a menu")]
pub struct Interactive {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    List,
    Show,
    Add,
    Edit,
    Delete,
    New,
    Open,
    Save,
    SaveAs,
    About,
    Exit,
}

impl Action {
    const ALL: [Self; 11] = [
        Self::List,
        Self::Show,
        Self::Add,
        Self::Edit,
        Self::Delete,
        Self::New,
        Self::Open,
        Self::Save,
        Self::SaveAs,
        Self::About,
        Self::Exit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::List => "List animals",
            Self::Show => "Show details",
            Self::Add => "New animal",
            Self::Edit => "Edit animal",
            Self::Delete => "Delete animal",
            Self::New => "New file",
            Self::Open => "Open…",
            Self::Save => "Save",
            Self::SaveAs => "Save as…",
            Self::About => "About",
            Self::Exit => "Exit",
        };
        f.write_str(label)
    }
}

impl Interactive {
    #[instrument(level = "debug", skip_all)]
    pub fn run<P: Preferences>(mut session: Session<P>) -> anyhow::Result<()> {
        let theme = ColorfulTheme::default();

        // Redraw the table whenever the records change.
        let stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&stale);
        session.store_mut().subscribe(move |event| {
            tracing::debug!(?event, "records changed");
            flag.set(true);
        });

        loop {
            if stale.replace(false) {
                println!("\n{}", session.title().info());
                print_table(session.store().records());
            }

            let choice = Select::with_theme(&theme)
                .with_prompt(session.title())
                .items(&Action::ALL[..])
                .default(0)
                .interact_opt()?;
            let action = choice.and_then(|i| Action::ALL.get(i).copied());

            match action {
                Some(Action::List) => stale.set(true),
                Some(Action::Show) => show(&session, &theme)?,
                Some(Action::Add) => add(&mut session, &theme)?,
                Some(Action::Edit) => edit(&mut session, &theme)?,
                Some(Action::Delete) => delete(&mut session, &theme)?,
                Some(Action::New) => session.new_file(),
                Some(Action::Open) => open(&mut session, &theme)?,
                Some(Action::Save) => save(&mut session, &theme)?,
                Some(Action::SaveAs) => save_as(&mut session, &theme)?,
                Some(Action::About) => about(),
                Some(Action::Exit) | None => {
                    exit(&mut session, &theme)?;
                    return Ok(());
                }
            }
        }
    }
}

fn show<P: Preferences>(session: &Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let Some(index) = select_record(session, theme, "Show which animal?")? else {
        report_no_selection(None);
        return Ok(());
    };
    let Some(record) = session.store().get(index) else {
        report_no_selection(None);
        return Ok(());
    };

    println!("{}", "Animal details".dim());
    println!("  Species:        {}", record.species);
    println!("  Feed type:      {}", record.feed_type);
    println!("  Current stock:  {}", record.current_stock);
    println!("  Unit:           {}", record.unit);
    println!("  Reorder needed: {}", record.reorder_needed);
    println!("  Reorder date:   {}", date::format_display(record.reorder_date));
    Ok(())
}

fn add<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let initial = RawRecord {
        reorder_needed: REORDER_CHOICES[1].to_string(),
        ..RawRecord::default()
    };
    if let Some(record) = edit_form(theme, initial)? {
        session.add(record);
    }
    Ok(())
}

fn edit<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let Some(index) = select_record(session, theme, "Edit which animal?")? else {
        report_no_selection(None);
        return Ok(());
    };
    let Some(initial) = session.store().get(index).map(RawRecord::from) else {
        report_no_selection(None);
        return Ok(());
    };

    if let Some(record) = edit_form(theme, initial)? {
        if let Err(e) = session.update(index, record) {
            report_no_selection(Some(&e));
        }
    }
    Ok(())
}

fn delete<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let Some(index) = select_record(session, theme, "Delete which animal?")? else {
        report_no_selection(None);
        return Ok(());
    };

    match session.remove(index) {
        Ok(removed) => println!("{}", format!("Deleted {}", removed.species).dim()),
        Err(e) => report_no_selection(Some(&e)),
    }
    Ok(())
}

fn open<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let path = prompt_path(theme, "Open animal file")?;

    match session.open(&path) {
        Ok(()) => println!("{}", format!("✅ Opened {}", path.display()).success()),
        Err(LoadError::NotFound) => {
            println!("{}", format!("No animal file at {}", path.display()).warning());
        }
        Err(e) => {
            println!(
                "{}",
                format!("Could not load data from file:\n{}\n{e}", path.display()).error()
            );
        }
    }
    Ok(())
}

fn save<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    match session.save() {
        Ok(SaveOutcome::Saved(path)) => report_saved(&path),
        Ok(SaveOutcome::NeedsPath) => save_as(session, theme)?,
        Err(e) => report_save_failure(session.store().current_file_path(), &e),
    }
    Ok(())
}

fn save_as<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let path = prompt_path(theme, "Save animal file as")?;

    match session.save_as(path.clone()) {
        Ok(SaveOutcome::Saved(path)) => report_saved(&path),
        Ok(SaveOutcome::NeedsPath) => {}
        Err(e) => report_save_failure(Some(&path), &e),
    }
    Ok(())
}

/// Asks to save unsaved changes. The session ends whatever the answer.
fn exit<P: Preferences>(session: &mut Session<P>, theme: &ColorfulTheme) -> anyhow::Result<()> {
    if !session.needs_save_prompt() {
        return Ok(());
    }

    let target = session
        .store()
        .current_file_path()
        .map_or_else(|| "a new file".to_string(), |p| format!("'{}'", p.display()));
    let confirmed = Confirm::with_theme(theme)
        .with_prompt(format!("Save the current data to {target}?"))
        .default(true)
        .interact_opt()?
        .unwrap_or(false);

    if confirmed {
        save(session, theme)?;
    }
    Ok(())
}

fn about() {
    println!(
        "{} {}\n{}",
        env!("CARGO_PKG_NAME").info(),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION")
    );
}

/// Collects the fields of a record, re-prompting until they are valid.
///
/// Returns `None` if the user gives up on invalid input.
fn edit_form(theme: &ColorfulTheme, initial: RawRecord) -> anyhow::Result<Option<AnimalRecord>> {
    let mut raw = initial;
    let mut date_text = date::format_display(raw.reorder_date);

    loop {
        raw.species = prompt_text(theme, "Species", &raw.species)?;
        raw.feed_type = prompt_text(theme, "Feed type", &raw.feed_type)?;
        raw.current_stock = prompt_text(theme, "Current stock", &raw.current_stock)?;
        raw.unit = prompt_text(theme, "Unit", &raw.unit)?;
        raw.reorder_needed = prompt_reorder(theme, &raw.reorder_needed)?;
        date_text = prompt_text(
            theme,
            "Reorder date (dd.mm.yyyy, 'today', empty for none)",
            &date_text,
        )?;

        let errors = match check_form(&mut raw, &date_text, date::today()) {
            Ok(record) => return Ok(Some(record)),
            Err(errors) => errors,
        };
        if let Some(errors) = ValidationErrors::from_vec(errors) {
            println!("{}", "Please correct the invalid fields".warning());
            println!("{}", errors.to_string().error());
        }

        let retry = Confirm::with_theme(theme)
            .with_prompt("Correct the input?")
            .default(true)
            .interact_opt()?
            .unwrap_or(false);
        if !retry {
            return Ok(None);
        }
    }
}

/// Validates the form fields together with the typed reorder date.
///
/// A date that parses is stored in `raw`. Field errors come first, in field
/// order, followed by the date error.
fn check_form(
    raw: &mut RawRecord,
    date_text: &str,
    today: NaiveDate,
) -> Result<AnimalRecord, Vec<FieldError>> {
    let reorder_date = date::parse_input(date_text, today);
    if let Ok(parsed) = &reorder_date {
        raw.reorder_date = *parsed;
    }

    let mut errors: Vec<FieldError> = match RecordValidator::validate(raw) {
        Ok(record) if reorder_date.is_ok() => return Ok(record),
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().cloned().collect(),
    };
    errors.extend(reorder_date.err());
    Err(errors)
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, initial: &str) -> dialoguer::Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
}

fn prompt_path(theme: &ColorfulTheme, prompt: &str) -> dialoguer::Result<PathBuf> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .interact_text()
        .map(PathBuf::from)
}

/// Offers the reorder choices. A stored value outside the choices is kept as
/// an extra option so that editing other fields does not lose it.
fn prompt_reorder(theme: &ColorfulTheme, current: &str) -> dialoguer::Result<String> {
    let mut options: Vec<String> = REORDER_CHOICES.iter().map(ToString::to_string).collect();
    if !current.is_empty() && !options.iter().any(|o| o == current) {
        options.insert(0, current.to_string());
    }
    let default = options.iter().position(|o| o == current).unwrap_or(0);

    let index = Select::with_theme(theme)
        .with_prompt("Reorder needed")
        .items(&options[..])
        .default(default)
        .interact()?;
    Ok(options.swap_remove(index))
}

fn select_record<P: Preferences>(
    session: &Session<P>,
    theme: &ColorfulTheme,
    prompt: &str,
) -> dialoguer::Result<Option<usize>> {
    let records = session.store().records();
    if records.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = records
        .iter()
        .map(|r| format!("{} ({})", r.species, r.feed_type))
        .collect();
    Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&labels[..])
        .default(0)
        .interact_opt()
}

fn report_no_selection(error: Option<&StoreError>) {
    if let Some(error) = error {
        tracing::debug!("{error}");
    }
    println!("{}", "No animal selected".warning());
    println!("Please select an animal in the table.");
}

fn report_saved(path: &Path) {
    println!("{}", format!("✅ Saved to {}", path.display()).success());
}

fn report_save_failure(path: Option<&Path>, error: &SaveError) {
    let target = path.map_or_else(String::new, |p| p.display().to_string());
    println!(
        "{}",
        format!("Could not save data to file:\n{target}\n{error}").error()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn form(species: &str, stock: &str) -> RawRecord {
        RawRecord {
            species: species.to_string(),
            feed_type: "Heu".to_string(),
            current_stock: stock.to_string(),
            unit: "Kg".to_string(),
            reorder_needed: "Nein".to_string(),
            reorder_date: None,
        }
    }

    #[test]
    fn valid_form_with_typed_date() {
        let mut raw = form("Kalb", "12");

        let record = check_form(&mut raw, "heute", today()).unwrap();

        assert_eq!(record.species, "Kalb");
        assert_eq!(record.reorder_date, Some(today()));
    }

    #[test]
    fn invalid_date_alone_is_reported() {
        let mut raw = form("Kalb", "12");

        let errors = check_form(&mut raw, "31.02.1999", today()).unwrap_err();

        assert_eq!(
            errors,
            [FieldError::InvalidReorderDate("31.02.1999".to_string())]
        );
        assert_eq!(raw.reorder_date, None);
    }

    #[test]
    fn date_error_follows_field_errors() {
        let mut raw = form("", "viel");

        let errors = check_form(&mut raw, "gestern", today()).unwrap_err();

        assert_eq!(
            errors,
            [
                FieldError::EmptySpecies,
                FieldError::NonNumericCurrentStock("viel".to_string()),
                FieldError::InvalidReorderDate("gestern".to_string()),
            ]
        );
    }

    #[test]
    fn empty_date_clears_the_stored_one() {
        let mut raw = RawRecord {
            reorder_date: Some(today()),
            ..form("Kalb", "12")
        };

        let record = check_form(&mut raw, "", today()).unwrap();

        assert_eq!(record.reorder_date, None);
    }
}
