use clap::{Parser, Subcommand};

/// Command-line interface definition for rLabourLedger
/// CLI application to keep a farm labour ledger on SQLite
#[derive(Parser)]
#[command(
    name = "rlabourledger",
    version = env!("CARGO_PKG_VERSION"),
    about = "A farm labour ledger: attendance credit, wages, payments and harvest-packet reports on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Pin today's date (YYYY-MM-DD) for the edit rule and the backend
    #[arg(global = true, long = "today", hide = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage labour groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Manage labourers
    Labourer {
        #[command(subcommand)]
        action: LabourerAction,
    },

    /// Show or record daily attendance
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Record a payment to a labourer
    Pay {
        #[arg(long = "labourer", help = "Labourer id")]
        labourer: i64,

        #[arg(long = "amount", allow_hyphen_values = true, help = "Amount paid (decimal)")]
        amount: String,

        #[arg(long = "date", help = "Payment date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(
            long = "type",
            help = "daily, weekly, monthly, advance or bonus (default from config)"
        )]
        payment_type: Option<String>,

        #[arg(long = "notes", help = "Free-text notes")]
        notes: Option<String>,
    },

    /// Show the payment log of a labourer, most recent first
    Payments {
        #[arg(long = "labourer", help = "Labourer id")]
        labourer: i64,
    },

    /// Wage ledger: working days, earnings, payments and balance
    Ledger {
        #[arg(long = "group", help = "Only this group")]
        group: Option<i64>,

        #[arg(long = "date", help = "Report date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "json", help = "Print JSON instead of a table")]
        json: bool,
    },

    /// Record or report harvest packets per group
    Work {
        #[command(subcommand)]
        action: WorkAction,
    },
}

#[derive(Subcommand)]
pub enum GroupAction {
    /// Add a labour group
    Add { name: String },
    /// List labour groups
    List,
}

#[derive(Subcommand)]
pub enum LabourerAction {
    /// Add a labourer to a group
    Add {
        name: String,

        #[arg(long = "village", default_value = "")]
        village: String,

        #[arg(long = "wage", help = "Daily wage (decimal)")]
        wage: Option<String>,

        #[arg(long = "group", help = "Group id")]
        group: i64,

        #[arg(long = "phone")]
        phone: Option<String>,
    },
    /// List labourers
    List,
}

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Show the attendance sheet of a group for a day
    Show {
        #[arg(long = "group")]
        group: i64,

        #[arg(long = "date", help = "Day to show (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Save the attendance sheet of a group (only for today)
    Save {
        #[arg(long = "group")]
        group: i64,

        #[arg(long = "date", help = "Day to save (YYYY-MM-DD, default today)")]
        date: Option<String>,

        /// LABOURER_ID=full|half|absent (f/h/a), repeatable
        #[arg(long = "set", value_name = "ID=STATUS")]
        set: Vec<String>,
    },

    /// Every recorded day, as per-group sheets
    History {
        #[arg(long = "json")]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum WorkAction {
    /// Save the packet counts of one group for a day
    Save {
        #[arg(long = "group")]
        group: i64,

        #[arg(long = "date", help = "Work date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "small")]
        small: Option<i64>,

        #[arg(long = "medium")]
        medium: Option<i64>,

        #[arg(long = "large")]
        large: Option<i64>,

        #[arg(long = "overlarge")]
        overlarge: Option<i64>,

        #[arg(long = "total", help = "Override the total (default: sum of the sizes)")]
        total: Option<i64>,

        #[arg(long = "notes")]
        notes: Option<String>,
    },

    /// Save several groups for the same day, each independently
    Batch {
        #[arg(long = "date", help = "Work date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        /// GROUP_ID=SMALL,MEDIUM,LARGE,OVERLARGE[,TOTAL], repeatable
        #[arg(long = "entry", value_name = "GROUP=S,M,L,O[,T]", required = true)]
        entries: Vec<String>,
    },

    /// Day snapshot next to the cumulative totals up to that day
    Report {
        #[arg(long = "date", help = "Report date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "json")]
        json: bool,
    },
}
