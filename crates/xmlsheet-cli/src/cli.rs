//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use xmlsheet::overlay::DEFAULT_STORE_FILE;

/// xmlsheet: spreadsheet-style editing over arbitrary XML catalogs
#[derive(Parser)]
#[command(name = "xmlsheet")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the overlay store file
    #[arg(long, global = true, env = "XMLSHEET_STORE", default_value = DEFAULT_STORE_FILE)]
    pub store: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the inferred record shape and the records of a catalog
    Inspect {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Maximum number of records to print
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the custom fields stored for a record
    Fields {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Record id
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Set a custom field on a record (slot_N overrides a source value)
    Set {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Record id
        #[arg(value_name = "ID")]
        id: String,

        /// Field name (e.g. slot_1, notes)
        #[arg(value_name = "NAME")]
        name: String,

        /// Field value
        #[arg(value_name = "VALUE")]
        value: String,

        /// Display label (default: the source label for slots, else the name)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Remove a custom field from a record
    Unset {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Record id
        #[arg(value_name = "ID")]
        id: String,

        /// Field name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Tag records with a new group column
    Group {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Group label (the column name is derived from it)
        #[arg(value_name = "LABEL")]
        label: String,

        /// Record ids to tag
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,
    },

    /// Delete a custom column from every record
    DropColumn {
        /// Column name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Export the catalog with the overlay applied
    Export {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "xml")]
        format: ExportFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fields to hide (e.g. slot_2, id, notes)
        #[arg(long, value_delimiter = ',')]
        hide: Vec<String>,

        /// Keep only rows where FIELD equals VALUE (repeatable)
        #[arg(long, value_name = "FIELD=VALUE")]
        filter: Vec<String>,

        /// Sort by id or a slot key
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Record ids to mark as deactivated
        #[arg(long, value_delimiter = ',')]
        deactivate: Vec<String>,

        /// Sort tagged records by group membership
        #[arg(long)]
        group_sort: bool,
    },

    /// Drop every edit and go back to the source document
    Restore,

    /// Show overlay store status (and the catalog summary if SOURCE is given)
    Status {
        /// Path to the XML file, or an http(s) URL
        #[arg(value_name = "SOURCE")]
        source: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the local JSON HTTP API
    Serve {
        /// Catalog to load at startup
        #[arg(value_name = "SOURCE")]
        source: Option<String>,

        /// Port for web server
        #[arg(short, long, env = "XMLSHEET_PORT", default_value = "3141")]
        port: u16,
    },
}

/// Export output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// XML with declaration and indented elements
    #[default]
    Xml,
    /// Comma-separated values, every field quoted
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Xml => write!(f, "xml"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}
