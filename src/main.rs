use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use friendforce::api::Transport;
use friendforce::config::ClientConfig;
use friendforce::core::{Contact, ContactType, DashboardStats, Reminder, ReminderFrequency};
use friendforce::error::ApiError;
use friendforce::view::blast::{self, BlastDraft};
use friendforce::view::contacts::{
    self as contact_view, ContactDraft, ContactFilter, TypeCounts, TypeFilter,
};
use friendforce::view::dashboard::{self as dashboard_view, LogMeetupDraft};
use friendforce::view::reminders::{self as reminder_view, ReminderDraft, ReminderPartition};
use friendforce::view::{self, FormState};
use friendforce::Friendforce;

#[derive(Debug, Parser)]
#[command(name = "friendforce", about = "Keep in touch with the people who matter", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Stats, contacts needing attention, recent meetups and upcoming reminders.
    Dashboard,
    /// List contacts, optionally filtered.
    Contacts {
        /// Case-insensitive match on name or email.
        #[arg(long, default_value = "")]
        search: String,
        /// all, friend, professional or mentor.
        #[arg(long = "type", default_value = "all", value_parser = parse_type_filter)]
        contact_type: TypeFilter,
    },
    /// Add a contact. Only the name is required.
    AddContact {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long = "type", default_value = "friend", value_parser = parse_contact_type)]
        contact_type: ContactType,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        birthday: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    DeleteContact {
        id: String,
    },
    /// Log a meetup with a contact.
    Log {
        id: String,
    },
    /// Pending and completed reminders.
    Reminders,
    AddReminder {
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        title: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        due: String,
        /// none, weekly, monthly, quarterly or yearly.
        #[arg(long, default_value = "none", value_parser = parse_frequency)]
        frequency: ReminderFrequency,
    },
    /// Mark a reminder as done.
    Complete {
        id: String,
    },
    DeleteReminder {
        id: String,
    },
    /// Preview a message to every contact with an email address.
    Blast {
        #[arg(required = true)]
        message: Vec<String>,
    },
}

fn parse_type_filter(s: &str) -> Result<TypeFilter, String> {
    TypeFilter::parse(s).ok_or_else(|| format!("unknown contact type: {}", s))
}

fn parse_contact_type(s: &str) -> Result<ContactType, String> {
    ContactType::parse(s).ok_or_else(|| format!("unknown contact type: {}", s))
}

fn parse_frequency(s: &str) -> Result<ReminderFrequency, String> {
    ReminderFrequency::parse(s).ok_or_else(|| format!("unknown frequency: {}", s))
}

fn contact_line(contact: &Contact, now: DateTime<Utc>) -> String {
    format!(
        "  [{}] {:<4} {} ({}){}  last contact: {}",
        contact.id,
        contact_view::initials(&contact.name),
        contact.name,
        contact.contact_type,
        if contact.has_email() { format!(" <{}>", contact.email) } else { String::new() },
        contact_view::last_contact_label(contact.last_contact, now),
    )
}

fn reminder_line(reminder: &Reminder, today: NaiveDate) -> String {
    format!(
        "  [{}] {} with {} ({}, {}, {})",
        reminder.id,
        reminder.title,
        reminder.contact_name,
        reminder.due_date.format("%b %-d, %Y"),
        reminder_view::due_label(reminder, today),
        reminder.frequency,
    )
}

fn dashboard_report(
    stats: Option<&DashboardStats>,
    stale: &[Contact],
    recent: &[Contact],
    upcoming: &[Reminder],
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Vec<String> {
    let mut lines: Vec<String> = dashboard_view::stat_tiles(stats)
        .iter()
        .map(|tile| format!("{:>20}: {}", tile.label, tile.value))
        .collect();
    lines.push(String::new());
    lines.push("Needs attention:".to_string());
    lines.extend(stale.iter().map(|c| contact_line(c, now)));
    lines.push(String::new());
    lines.push("Recent:".to_string());
    lines.extend(recent.iter().map(|c| contact_line(c, now)));
    lines.push(String::new());
    lines.push("Upcoming:".to_string());
    if upcoming.is_empty() {
        lines.push("  No upcoming reminders".to_string());
    }
    lines.extend(upcoming.iter().map(|r| reminder_line(r, today)));
    lines
}

async fn run<T: Transport>(app: &Friendforce<T>, command: Command) -> friendforce::Result<()> {
    let now = Utc::now();
    match command {
        Command::Dashboard => {
            let stats = app.dashboard.stats().await?;
            let stale = app.dashboard.stale().await?;
            let recent = app.dashboard.recent().await?;
            let upcoming = app.reminders.upcoming().await?;
            for line in dashboard_report(Some(&stats), &stale, &recent, &upcoming, now, view::today()) {
                println!("{}", line);
            }
        }
        Command::Contacts { search, contact_type } => {
            let filter = ContactFilter::new(search, contact_type);
            let contacts = app.contacts.list().await?;
            let counts = TypeCounts::of(&contacts);
            let summary: Vec<String> = ContactType::ALL
                .iter()
                .map(|t| format!("{}: {}", t, counts.get(*t)))
                .collect();
            println!("{} contacts ({})", counts.total(), summary.join(", "));
            for contact in filter.apply(&contacts) {
                println!("{}", contact_line(contact, now));
            }
        }
        Command::AddContact { name, email, phone, contact_type, birthday, notes } => {
            let mut form = FormState::default();
            form.open(ContactDraft { name, email, phone, contact_type, birthday, notes });
            let contact = form
                .submit(|data| {
                    let contacts = app.contacts.clone();
                    async move { contacts.create(&data).await }
                })
                .await?;
            println!("{} ({})", contact_view::CONTACT_ADDED, contact.id);
        }
        Command::DeleteContact { id } => {
            app.contacts.delete(&id).await?;
            println!("{}", contact_view::CONTACT_DELETED);
        }
        Command::Log { id } => {
            let mut form = FormState::default();
            form.open(LogMeetupDraft { contact_id: id });
            form.submit(|id| {
                let contacts = app.contacts.clone();
                async move { contacts.log_interaction(&id).await }
            })
            .await?;
            println!("{}", dashboard_view::MEETUP_LOGGED);
        }
        Command::Reminders => {
            let reminders = app.reminders.list().await?;
            let today = view::today();
            let parts = ReminderPartition::of(&reminders);
            println!("Pending ({}):", parts.pending.len());
            for r in &parts.pending {
                println!("{}", reminder_line(r, today));
            }
            println!("Completed ({}):", parts.completed.len());
            for r in &parts.completed {
                println!("  [{}] {} with {}", r.id, r.title, r.contact_name);
            }
        }
        Command::AddReminder { contact, title, due, frequency } => {
            let mut form = FormState::default();
            form.open(ReminderDraft { contact, title, due_date: due, frequency });
            let reminder = form
                .submit(|data| {
                    let reminders = app.reminders.clone();
                    async move { reminders.create(&data).await }
                })
                .await?;
            println!("{} ({})", reminder_view::REMINDER_CREATED, reminder.id);
        }
        Command::Complete { id } => {
            app.reminders.complete(&id).await?;
            println!("{}", reminder_view::REMINDER_COMPLETED);
        }
        Command::DeleteReminder { id } => {
            app.reminders.delete(&id).await?;
            println!("{}", reminder_view::REMINDER_DELETED);
        }
        Command::Blast { message } => {
            let contacts = app.contacts.list().await?;
            let mut draft = BlastDraft::new(&contacts);
            draft.message = message.join(" ");
            let mut form = FormState::default();
            form.open(draft);
            let confirmation = form
                .submit(|preview| async move { Ok::<_, ApiError>(blast::send(&preview)) })
                .await?;
            println!("{}", confirmation);
        }
    }
    Ok(())
}

/// Journal logging (`journalctl --user -t friendforce -f`). This crate logs
/// at info, or debug when enabled in config; everything else at warn.
fn init_logging(config: &ClientConfig) {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("friendforce") {
                let max = if friendforce::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    friendforce::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("friendforce".to_string()),
        Err(e) => {
            eprintln!("Journal unavailable, logging disabled: {}", e);
            return;
        }
    };
    if let Err(e) = log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })) {
        eprintln!("Failed to install logger: {}", e);
        return;
    }
    // Global max must be Debug so our debug logs can pass through when toggled
    log::set_max_level(log::LevelFilter::Debug);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let path = ClientConfig::default_path();
    let config = ClientConfig::load(&path);
    init_logging(&config);
    if let Err(e) = ClientConfig::write_default_if_missing(&path) {
        log::warn!("Could not write default config to {}: {}", path.display(), e);
    }

    let app = match Friendforce::connect(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_validation() {
                log::error!("Command failed: {}", e);
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("friendforce").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    fn reminder(title: &str, due_date: NaiveDate) -> Reminder {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Reminder {
            id: "r1".to_string(),
            contact: "c1".to_string(),
            contact_name: "Ada".to_string(),
            title: title.to_string(),
            due_date,
            frequency: ReminderFrequency::Monthly,
            completed: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn contacts_filter_flags() {
        let cmd = parse(&["contacts", "--search", "ada", "--type", "Mentor"]).unwrap();
        assert_eq!(
            cmd,
            Command::Contacts {
                search: "ada".to_string(),
                contact_type: TypeFilter::Only(ContactType::Mentor),
            }
        );
        let cmd = parse(&["contacts"]).unwrap();
        assert_eq!(
            cmd,
            Command::Contacts {
                search: String::new(),
                contact_type: TypeFilter::All,
            }
        );
    }

    #[test]
    fn add_reminder_collects_fields() {
        let cmd = parse(&[
            "add-reminder", "--contact", "c1", "--title", "Coffee", "--due", "2026-11-01",
            "--frequency", "monthly",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::AddReminder {
                contact: "c1".to_string(),
                title: "Coffee".to_string(),
                due: "2026-11-01".to_string(),
                frequency: ReminderFrequency::Monthly,
            }
        );
    }

    #[test]
    fn missing_fields_are_left_to_validation() {
        let cmd = parse(&["add-contact", "--email", "a@b.c"]).unwrap();
        let Command::AddContact { name, contact_type, .. } = cmd else {
            panic!("expected add-contact");
        };
        assert!(name.is_empty());
        assert_eq!(contact_type, ContactType::Friend);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&[]).is_err());
        assert_eq!(parse(&["frobnicate"]).unwrap_err().kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(
            parse(&["contacts", "--colour", "red"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["complete"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["contacts", "--type", "rival"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(
            parse(&["add-reminder", "--frequency", "hourly"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert_eq!(parse(&["blast"]).unwrap_err().kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn blast_takes_every_word() {
        assert_eq!(
            parse(&["blast", "see", "you", "soon"]).unwrap(),
            Command::Blast {
                message: vec!["see".to_string(), "you".to_string(), "soon".to_string()],
            }
        );
    }

    #[test]
    fn dashboard_lists_upcoming_reminders() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let upcoming = vec![
            reminder("Coffee", today + Duration::days(1)),
            reminder("Call", today - Duration::days(3)),
        ];
        let lines = dashboard_report(None, &[], &[], &upcoming, now, today);

        let header = lines.iter().position(|l| l == "Upcoming:").unwrap();
        assert!(lines[header + 1].contains("Coffee with Ada"));
        assert!(lines[header + 1].contains("Tomorrow"));
        assert!(lines[header + 2].contains("3 days overdue"));
        assert!(lines[0].ends_with("Total Contacts: 0"));
    }

    #[test]
    fn dashboard_without_upcoming_says_so() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let lines = dashboard_report(None, &[], &[], &[], now, today);
        assert_eq!(lines.last().map(String::as_str), Some("  No upcoming reminders"));
    }
}
