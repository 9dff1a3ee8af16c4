use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

/// Which calendar day to generate the report for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDate {
    Literal(NaiveDate),
    Yesterday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    Insert,
    Update,
}

/// Generates the daily service-quality report for one operating day and
/// writes it to the `reports` table.
///
/// Connection credentials are taken from DB_USER, DB_PASSWORD, DB_HOST,
/// DB_PORT and DB_DATABASE if not given on the command line.
#[derive(Parser, Debug)]
#[command(name = "transit-report", version)]
pub struct Cli {
    /// The operating date to report on (YYYY-MM-DD), or "yesterday".
    #[arg(long, default_value = "yesterday")]
    pub date: String,

    /// Whether to insert a new reports row or update the existing one for
    /// this date.
    #[arg(long, value_enum, default_value = "insert")]
    pub new_report: ReportMode,

    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[arg(short = 'u', long, env = "DB_USER", default_value = "transit")]
    pub user: String,

    #[arg(short = 'p', long, env = "DB_PASSWORD")]
    pub password: String,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "DB_PORT", default_value = "3306")]
    pub port: u16,

    #[arg(short = 'd', long, env = "DB_DATABASE", default_value = "transit")]
    pub database: String,

    /// Fraction of the common scheduled interval under which two
    /// consecutive arrivals at a stop count as a bunch.
    #[arg(long, default_value_t = 0.2)]
    pub bunch_threshold_ratio: f64,

    /// Fraction of the common scheduled interval over which two
    /// consecutive arrivals at a stop count as a gap.
    #[arg(long, default_value_t = 1.5)]
    pub gap_threshold_ratio: f64,

    /// Bin width, in minutes, for the bunch/gap time-series.
    #[arg(long, default_value_t = 10)]
    pub bin_minutes: i64,

    /// Fixed UTC offset (in hours) of the operating time zone, used to turn
    /// a local calendar date into the `[D 07:00 UTC, D+1 07:00 UTC)` window
    /// the `locations` table is queried with.
    #[arg(long, default_value_t = -7)]
    pub utc_offset_hours: i64,
}

impl Cli {
    pub fn parse_date(&self) -> crate::errors::FnResult<ReportDate> {
        if self.date.eq_ignore_ascii_case("yesterday") {
            Ok(ReportDate::Yesterday)
        } else {
            let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")?;
            Ok(ReportDate::Literal(date))
        }
    }
}

/// Thresholds and knobs that stay constant for one run, resolved once from
/// [`Cli`] so pipeline stages don't need to carry `Cli` itself around.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub bunch_threshold_ratio: f64,
    pub gap_threshold_ratio: f64,
    pub bin_minutes: i64,
    pub utc_offset_hours: i64,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl From<&Cli> for RunConfig {
    fn from(cli: &Cli) -> Self {
        RunConfig {
            bunch_threshold_ratio: cli.bunch_threshold_ratio,
            gap_threshold_ratio: cli.gap_threshold_ratio,
            bin_minutes: cli.bin_minutes,
            utc_offset_hours: cli.utc_offset_hours,
            user: cli.user.clone(),
            password: cli.password.clone(),
            host: cli.host.clone(),
            port: cli.port,
            database: cli.database.clone(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            bunch_threshold_ratio: 0.2,
            gap_threshold_ratio: 1.5,
            bin_minutes: 10,
            utc_offset_hours: -7,
            user: "transit".into(),
            password: String::new(),
            host: "localhost".into(),
            port: 3306,
            database: "transit".into(),
        }
    }
}
