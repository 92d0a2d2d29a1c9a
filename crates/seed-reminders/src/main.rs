use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{info, warn};

use database::{reminder, Database, DatabaseError, NewReminder};
use recurrence::Zone;

#[derive(Debug, Parser)]
#[command(name = "seed-reminders")]
#[command(about = "Insert a set of demo reminders for one phone number")]
struct Args {
    /// SQLite database URL. Falls back to SQLITE_PATH env.
    #[arg(long)]
    database_url: Option<String>,

    /// E.164 phone number the reminders call
    #[arg(long, default_value = "+917018224197")]
    phone: String,

    /// Owning user id to attach
    #[arg(long)]
    user_id: Option<String>,

    /// Fixed UTC offset to read times in (e.g. +05:30). Defaults to local time.
    #[arg(long)]
    utc_offset: Option<Zone>,
}

/// (what, time, frequency)
const DEMO_REMINDERS: &[(&str, &str, &str)] = &[
    ("Take KALLA KHATTA morning medicine", "12:08 PM", "daily"),
    ("Take evening medicine", "8:00 PM", "daily"),
    ("Doctor appointment reminder", "2:00 PM", "once"),
    ("Exercise routine", "6:00 AM", "daily"),
    ("Weekly health checkup", "10:00 AM", "weekly"),
    ("Take vitamin supplements", "after dinner", "daily"),
    ("Blood pressure check", "7:00 PM", "twice a day"),
    ("Monthly medication refill", "11:00 AM", "monthly"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let database_url = args
        .database_url
        .clone()
        .or_else(|| std::env::var("SQLITE_PATH").ok())
        .unwrap_or_else(|| "sqlite:reminders.db?mode=rwc".to_string());
    let zone = args.utc_offset.unwrap_or_default();

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let now = Utc::now();
    let seeded = seed(&db, &args.phone, args.user_id.as_deref(), &zone, now).await?;

    info!(
        count = seeded,
        phone = %args.phone,
        active = reminder::count_active(db.pool()).await?,
        "Demo reminders created"
    );

    db.close().await;
    Ok(())
}

/// Insert the demo set. Returns how many were created.
async fn seed(
    db: &Database,
    phone: &str,
    user_id: Option<&str>,
    zone: &Zone,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let mut created = 0;

    for (what, time, frequency) in DEMO_REMINDERS {
        let mut new = NewReminder::new(phone, *what, *time, *frequency);
        if let Some(user_id) = user_id {
            new = new.with_user_id(user_id);
        }

        let result = reminder::create_reminder(db.pool(), &new, zone, now).await?;
        let r = &result.reminder;
        if r.is_scheduled() {
            let next = DateTime::<Utc>::from_timestamp_millis(r.next_call_time)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            info!(
                id = %r.id,
                what = %r.what,
                time = %r.time,
                frequency = %r.frequency,
                next = %next,
                "Created reminder"
            );
        } else {
            warn!(
                id = %r.id,
                what = %r.what,
                time = %r.time,
                "Created reminder with no upcoming call"
            );
        }
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[tokio::test]
    async fn test_seed_inserts_demo_set() {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let zone = Zone::Fixed(ist);
        // 13:00 in +05:30
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 7, 30, 0).unwrap();

        let count = seed(&db, "+917018224197", Some("user-1"), &zone, now)
            .await
            .unwrap();
        assert_eq!(count, DEMO_REMINDERS.len());

        let all = reminder::list_by_phone(db.pool(), "+917018224197")
            .await
            .unwrap();
        assert_eq!(all.len(), DEMO_REMINDERS.len());
        assert!(all.iter().all(|r| r.user_id.as_deref() == Some("user-1")));

        // 2:00 PM once is still ahead at 13:00
        let appointment = all
            .iter()
            .find(|r| r.what == "Doctor appointment reminder")
            .unwrap();
        assert!(appointment.is_scheduled());

        // 12:08 PM daily has passed, so it rolls to tomorrow
        let morning = all
            .iter()
            .find(|r| r.what.starts_with("Take KALLA"))
            .unwrap();
        let expected = ist
            .with_ymd_and_hms(2025, 3, 11, 12, 8, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(morning.next_call_time, expected);
    }

    #[test]
    fn test_args_parse_offset() {
        let args = Args::parse_from(["seed-reminders", "--utc-offset", "+05:30"]);
        assert_eq!(
            args.utc_offset,
            Some(Zone::Fixed(FixedOffset::east_opt(19800).unwrap()))
        );
        assert_eq!(args.phone, "+917018224197");
    }
}
