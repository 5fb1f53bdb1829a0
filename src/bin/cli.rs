//! SlotBook CLI
//!
//! Administrative command-line interface over a SlotBook snapshot file.

use std::io::Write;
use std::process;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use slotbook::{Config, Day, PasswordPolicy, ReservationKey, SnapshotFormat, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// SlotBook CLI
#[derive(Parser, Debug)]
#[command(name = "slotbook")]
#[command(about = "Administer an hourly slot reservation store")]
#[command(version)]
struct Cli {
    /// Snapshot file
    #[arg(short, long, default_value = "./users.json")]
    data_file: String,

    /// Write compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,

    /// Skip fsync before replacing the snapshot
    #[arg(long)]
    no_sync: bool,

    /// Administrative account guaranteed at startup
    #[arg(long, default_value = "admin")]
    admin: String,

    /// Password for the administrative account if it has to be created
    #[arg(long, default_value = "password")]
    admin_password: String,

    #[command(subcommand)]
    command: Commands,
}

/// A reservation key given as positional arguments
#[derive(Args, Debug)]
struct KeyArgs {
    year: i32,
    month: i32,
    day: i32,
    /// Hour of the day (0-23)
    slot: i32,
}

impl From<KeyArgs> for ReservationKey {
    fn from(k: KeyArgs) -> Self {
        ReservationKey::new(k.year, k.month, k.day, k.slot)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or normalise the snapshot file (admin account, sorted names)
    Init,

    /// Add an account
    AddAccount { name: String, password: String },

    /// Remove an account and release its slots
    RemoveAccount { name: String },

    /// Change an account's password
    Passwd {
        name: String,
        old: String,
        new: String,
        /// Repeat of the new password (defaults to NEW)
        confirm: Option<String>,
    },

    /// Reserve a slot for an account
    Book {
        name: String,
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Cancel an account's reservation
    Cancel {
        name: String,
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Show the owner of every slot on a day
    Day {
        #[arg(requires_all = ["month", "day"])]
        year: Option<i32>,
        #[arg(requires_all = ["year", "day"])]
        month: Option<i32>,
        #[arg(requires_all = ["year", "month"])]
        day: Option<i32>,

        /// Days from today instead of an explicit date
        #[arg(long = "in", conflicts_with_all = ["year", "month", "day"])]
        in_days: Option<i64>,
    },

    /// Remove reservations dated before a day (default: today)
    Gc {
        /// Reference date, YYYY-MM-DD
        #[arg(long)]
        before: Option<NaiveDate>,
    },

    /// Remove every reservation
    Clear,

    /// Print every account, passwords included
    Dump,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotbook=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    tracing::debug!("SlotBook v{}", slotbook::VERSION);
    tracing::debug!("Snapshot file: {}", args.data_file);

    let format = if args.compact {
        SnapshotFormat::Compact
    } else {
        SnapshotFormat::Pretty
    };

    // Build config from args
    let config = Config::builder()
        .data_file(&args.data_file)
        .snapshot_format(format)
        .sync_on_save(!args.no_sync)
        .admin_name(&args.admin)
        .admin_password(&args.admin_password)
        .build();

    let store = match startup(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&store, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

/// Open the store, guarantee the admin account and sort by name
fn startup(config: &Config) -> slotbook::Result<Store> {
    let store = Store::open(config)?;
    if store.ensure_account(&config.admin_name, &config.admin_password)? {
        tracing::info!("Created administrative account '{}'", config.admin_name);
    }
    store.sort_by_name()?;
    Ok(store)
}

fn run(store: &Store, command: Commands) -> slotbook::Result<()> {
    match command {
        Commands::Init => {
            tracing::info!("{} accounts ready", store.account_count());
        }
        Commands::AddAccount { name, password } => {
            store.add_account(&name, &password)?;
            // Keep the listing deterministic
            store.sort_by_name()?;
            println!("Added account {}", name);
        }
        Commands::RemoveAccount { name } => {
            store.remove_account(&name)?;
            println!("Removed account {}", name);
        }
        Commands::Passwd {
            name,
            old,
            new,
            confirm,
        } => {
            let confirm = confirm.unwrap_or_else(|| new.clone());
            PasswordPolicy::default().validate(&new, &confirm)?;
            store.set_password(&name, &old, &new)?;
            println!("Password changed for {}", name);
        }
        Commands::Book { name, key } => {
            let key = ReservationKey::from(key);
            store.add_reservation(&name, key)?;
            println!("Reserved {} for {}", key, name);
        }
        Commands::Cancel { name, key } => {
            let key = ReservationKey::from(key);
            store.remove_reservation(&name, &key)?;
            println!("Cancelled {} for {}", key, name);
        }
        Commands::Day {
            year,
            month,
            day,
            in_days,
        } => {
            let day = match (year, month, day) {
                (Some(y), Some(m), Some(d)) => Day::new(y, m, d),
                _ => Day::in_days(in_days.unwrap_or(0))?,
            };
            print_day(store, &day);
        }
        Commands::Gc { before } => {
            let day = before.map(Day::from).unwrap_or_else(Day::today);
            let removed = store.remove_reservations_before(day)?;
            println!("Removed {} reservations before {}", removed, day);
        }
        Commands::Clear => {
            let removed = store.clear_all_reservations()?;
            println!("Removed {} reservations", removed);
        }
        Commands::Dump => {
            let bytes = store.snapshot_readable()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn print_day(store: &Store, day: &Day) {
    let heading = match day.to_naive_date() {
        Some(date) => date.format("%A, %-d of %B %Y").to_string(),
        None => day.to_string(),
    };
    println!("{}", heading);
    for (slot, owner) in store.reservations_on_day(day).iter().enumerate() {
        println!("{:02}:00  {}", slot, owner.as_deref().unwrap_or("-"));
    }
}
