//! disaster-etl CLI - build the labelled messages table
//!
//! ```bash
//! disaster-etl messages.csv categories.csv                      # -> Disaster_Response.db / labelled_messages
//! disaster-etl messages.csv categories.csv out.db my_table
//! disaster-etl messages.csv categories.csv --join id --strict-row-count
//! disaster-etl messages.csv categories.csv --dry-run > table.json
//! ```

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use disaster_etl::logs::log_error;
use disaster_etl::{
    extract_and_transform, run_etl, EtlConfig, JoinStrategy, PipelineError, RowCountPolicy,
    TransformOptions, DEFAULT_DATABASE_PATH, DEFAULT_TABLE_NAME,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "disaster-etl", version)]
#[command(about = "Merge messages with their encoded categories into a labelled SQLite table", long_about = None)]
struct Cli {
    /// Messages CSV file
    messages: PathBuf,

    /// Categories CSV file (identifier + encoded categories string)
    categories: PathBuf,

    /// SQLite database to write to
    #[arg(default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    /// Table to replace with the result
    #[arg(default_value = DEFAULT_TABLE_NAME)]
    table: String,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Identifier column shared by both files
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Column holding the encoded categories string
    #[arg(long, default_value = "categories")]
    categories_column: String,

    /// How categories rows are matched to messages
    #[arg(long, value_enum, default_value_t = JoinArg::Position)]
    join: JoinArg,

    /// Fail instead of truncating when the two files differ in row count
    #[arg(long)]
    strict_row_count: bool,

    /// Print the resulting table as JSON instead of writing the database
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum JoinArg {
    /// Row i of messages goes with row i of categories
    Position,
    /// Match rows on the identifier column
    Id,
}

impl Cli {
    fn into_config(self) -> (EtlConfig, bool) {
        let options = TransformOptions {
            id_column: self.id_column,
            categories_column: self.categories_column,
            join: match self.join {
                JoinArg::Position => JoinStrategy::Positional,
                JoinArg::Id => JoinStrategy::ById,
            },
            row_count_policy: if self.strict_row_count {
                RowCountPolicy::Strict
            } else {
                RowCountPolicy::Truncate
            },
        };

        let config = EtlConfig {
            messages_path: self.messages,
            categories_path: self.categories,
            database_path: self.database,
            table_name: self.table,
            delimiter: self.delimiter,
            options,
        };
        (config, self.dry_run)
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            print_usage();
            return;
        }
        Err(e) => e.exit(),
    };

    let (config, dry_run) = cli.into_config();
    let result = if dry_run {
        cmd_dry_run(&config)
    } else {
        cmd_run(&config)
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "Please provide the paths of the messages and categories CSV files as the first \
         and second arguments, optionally the SQLite database to write to as the third \
         (default: \"{}\") and the table name as the fourth (default: \"{}\").\n",
        DEFAULT_DATABASE_PATH, DEFAULT_TABLE_NAME
    );
    eprintln!("Example: disaster-etl messages.csv categories.csv Disaster_Response.db\n");
    eprintln!("{}", Cli::command().render_usage());
}

fn cmd_run(config: &EtlConfig) -> Result<(), PipelineError> {
    let report = run_etl(config)?;
    eprintln!(
        "\n✨ Done! {} rows, {} columns ({} categories), {} duplicates removed",
        report.rows_written,
        report.columns.len(),
        report.categories,
        report.duplicates_removed
    );
    Ok(())
}

fn cmd_dry_run(config: &EtlConfig) -> Result<(), PipelineError> {
    let output = extract_and_transform(config)?;
    let json = serde_json::to_string_pretty(&output.relation)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_defaults() {
        let cli = Cli::try_parse_from(["disaster-etl", "m.csv", "c.csv"]).unwrap();
        let (config, dry_run) = cli.into_config();

        assert_eq!(config.database_path, PathBuf::from("Disaster_Response.db"));
        assert_eq!(config.table_name, "labelled_messages");
        assert_eq!(config.options, TransformOptions::default());
        assert!(!dry_run);
    }

    #[test]
    fn test_all_arguments() {
        let cli = Cli::try_parse_from([
            "disaster-etl",
            "m.csv",
            "c.csv",
            "out.db",
            "msgs",
            "--join",
            "id",
            "--strict-row-count",
            "-d",
            ";",
            "--dry-run",
        ])
        .unwrap();
        let (config, dry_run) = cli.into_config();

        assert_eq!(config.database_path, PathBuf::from("out.db"));
        assert_eq!(config.table_name, "msgs");
        assert_eq!(config.delimiter, Some(';'));
        assert_eq!(config.options.join, JoinStrategy::ById);
        assert_eq!(config.options.row_count_policy, RowCountPolicy::Strict);
        assert!(dry_run);
    }

    #[test]
    fn test_missing_required_argument_kind() {
        let err = Cli::try_parse_from(["disaster-etl", "m.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
