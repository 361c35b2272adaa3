//! Comic Collection CLI
//!
//! Command-line tool for viewing and maintaining comic book collection files.

use clap::{Parser, Subcommand, ValueEnum};
use comic_core::{
    calculate_count, field_options, write_visible_csv, Action, AppSettings, AppState, Field,
    FieldKind, FieldValue, FormRecord, Outcome, Record, SortDirection, SortKey, Viewport,
    CLEAR_MARKER, CLEAR_TEXT, MAIN_TABLE_ID,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "comic-cli")]
#[command(about = "Comic Book Collection Manager", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (JSON) overriding the settings stored in the collection
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty collection file
    New {
        /// Output path (defaults to the configured default filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a collection file
    Info {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the filtered and sorted grid
    Show {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// Filter as field=pattern; replaces the saved filters
        #[arg(long, value_parser = parse_assignment)]
        filter: Vec<(Field, String)>,

        /// Combine filters with OR instead of AND
        #[arg(long)]
        or: bool,

        /// Sort key as field or field:desc; replaces the saved sort order
        #[arg(short, long, value_parser = parse_sort_key)]
        sort: Vec<SortKey>,

        /// Columns to display (comma-separated field keys)
        #[arg(short, long, value_delimiter = ',', value_parser = parse_field)]
        columns: Vec<Field>,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Screen layout whose columns and sort order are used
        #[arg(long, value_enum, default_value = "default")]
        viewport: ViewportArg,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add one record
    Add {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// Field value as field=value; lists are comma-separated
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(Field, String)>,
    },

    /// Add a run of issues generated from one template
    BulkAdd {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// First issue number
        #[arg(long)]
        start: String,

        /// Last issue number (inclusive)
        #[arg(long)]
        end: String,

        /// Template value as field=value; month and year are required
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(Field, String)>,

        /// Only print how many records would be generated
        #[arg(long)]
        preview: bool,
    },

    /// Edit every record matching the filters
    BatchEdit {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// Filter as field=pattern selecting the records to edit
        #[arg(long, required = true, value_parser = parse_assignment)]
        filter: Vec<(Field, String)>,

        /// Combine filters with OR instead of AND
        #[arg(long)]
        or: bool,

        /// New value as field=value; a single space or __CLEAR__ clears the field
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(Field, String)>,

        /// Fields to clear
        #[arg(long, value_delimiter = ',', value_parser = parse_field)]
        clear: Vec<Field>,

        /// Append to existing comments instead of replacing them
        #[arg(long)]
        append_comments: bool,
    },

    /// Delete every record matching the filters
    Delete {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// Filter as field=pattern selecting the records to delete
        #[arg(long, required = true, value_parser = parse_assignment)]
        filter: Vec<(Field, String)>,

        /// Combine filters with OR instead of AND
        #[arg(long)]
        or: bool,
    },

    /// List the suggestion values for a field
    Options {
        /// Collection file
        #[arg(short, long)]
        file: PathBuf,

        /// Field key
        #[arg(long, value_parser = parse_field)]
        field: Field,
    },

    /// Re-save a collection as a normalized versioned document
    Export {
        /// Collection file (versioned or legacy)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewportArg {
    Default,
    Mobile,
    Desktop,
}

impl From<ViewportArg> for Viewport {
    fn from(arg: ViewportArg) -> Self {
        match arg {
            ViewportArg::Default => Viewport::Default,
            ViewportArg::Mobile => Viewport::Mobile,
            ViewportArg::Desktop => Viewport::Desktop,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "comic_cli=debug,comic_core=debug"
    } else {
        "comic_cli=info,comic_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> comic_core::Result<()> {
    let settings = match &cli.settings {
        Some(path) => Some(AppSettings::load(path)?),
        None => None,
    };

    match cli.command {
        Commands::New { output } => cmd_new(settings, output),
        Commands::Info { file } => cmd_info(&file, settings),
        Commands::Show {
            file,
            filter,
            or,
            sort,
            columns,
            limit,
            viewport,
            format,
        } => cmd_show(
            &file,
            settings,
            ShowOptions {
                filter,
                or,
                sort,
                columns,
                limit,
                viewport: viewport.into(),
                format,
            },
        ),
        Commands::Add { file, values } => cmd_add(&file, settings, &values),
        Commands::BulkAdd {
            file,
            start,
            end,
            values,
            preview,
        } => cmd_bulk_add(&file, settings, &start, &end, &values, preview),
        Commands::BatchEdit {
            file,
            filter,
            or,
            values,
            clear,
            append_comments,
        } => cmd_batch_edit(&file, settings, filter, or, &values, &clear, append_comments),
        Commands::Delete { file, filter, or } => cmd_delete(&file, settings, filter, or),
        Commands::Options { file, field } => cmd_options(&file, settings, field),
        Commands::Export { file, output } => cmd_export(&file, settings, &output),
    }
}

/// Load a collection, then apply command-line settings over the stored ones
fn open(file: &Path, settings: Option<AppSettings>) -> comic_core::Result<AppState> {
    let mut state = AppState::new();
    state.load_from_file(file)?;
    if let Some(settings) = settings {
        state.dispatch(Action::UpdateSettings(settings))?;
    }
    Ok(state)
}

/// Replace the filters and select every row they leave visible
fn select_matching(
    state: &mut AppState,
    filter: Vec<(Field, String)>,
    or: bool,
) -> comic_core::Result<usize> {
    apply_filters(state, filter, or)?;
    state.dispatch(Action::ToggleSelectAll {
        table_id: MAIN_TABLE_ID.to_string(),
    })?;
    Ok(state.selection.len())
}

fn apply_filters(
    state: &mut AppState,
    filter: Vec<(Field, String)>,
    or: bool,
) -> comic_core::Result<()> {
    state.dispatch(Action::ClearFilters)?;
    for (field, pattern) in filter {
        state.dispatch(Action::SetFilter { field, pattern })?;
    }
    state.dispatch(Action::SetOrFiltering(or))?;
    Ok(())
}

fn cmd_new(settings: Option<AppSettings>, output: Option<PathBuf>) -> comic_core::Result<()> {
    let mut state = AppState::with_settings(settings.unwrap_or_default());
    state.dispatch(Action::NewCollection)?;

    let output = output
        .or_else(|| state.file_name.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(comic_core::DEFAULT_FILENAME));
    state.save_to_file(&output)?;

    println!("Created empty collection {}", output.display());
    Ok(())
}

fn cmd_info(file: &Path, settings: Option<AppSettings>) -> comic_core::Result<()> {
    let state = open(file, settings)?;

    println!("File: {}", file.display());
    println!("Records: {}", state.records.len());
    println!("Copies: {}", state.records.iter().map(|r| r.quantity).sum::<i64>());
    println!();

    if state.view.filters.is_empty() {
        println!("Filters: none");
    } else {
        let mode = if state.view.use_or_filtering { "OR" } else { "AND" };
        println!("Filters ({}):", mode);
        for (field, pattern) in &state.view.filters {
            println!("  {} = {}", field, pattern);
        }
    }

    for viewport in Viewport::ALL {
        let Some(layout) = state.view.layout(viewport) else {
            continue;
        };
        let columns: Vec<&str> = layout.visible_fields().iter().map(|f| f.key()).collect();
        println!();
        println!("{:?} columns: {}", viewport, columns.join(", "));
        for (table_id, spec) in &layout.table_sorts {
            let keys: Vec<String> = spec.iter().map(format_sort_key).collect();
            println!("  sort {}: {}", table_id, keys.join(", "));
        }
    }

    println!();
    println!("Visible rows: {}", state.visible_rows(MAIN_TABLE_ID).len());

    Ok(())
}

struct ShowOptions {
    filter: Vec<(Field, String)>,
    or: bool,
    sort: Vec<SortKey>,
    columns: Vec<Field>,
    limit: Option<usize>,
    viewport: Viewport,
    format: OutputFormat,
}

fn cmd_show(file: &Path, settings: Option<AppSettings>, options: ShowOptions) -> comic_core::Result<()> {
    let mut state = open(file, settings)?;
    state.dispatch(Action::SetViewport(options.viewport))?;

    if !options.filter.is_empty() {
        apply_filters(&mut state, options.filter, options.or)?;
    } else if options.or {
        state.dispatch(Action::SetOrFiltering(true))?;
    }
    if !options.sort.is_empty() {
        state.dispatch(Action::SetSort {
            table_id: MAIN_TABLE_ID.to_string(),
            spec: options.sort,
        })?;
    }

    let columns = if options.columns.is_empty() {
        state.visible_fields()
    } else {
        options.columns
    };

    let rows = state.visible_rows(MAIN_TABLE_ID);
    let row_limit = options.limit.unwrap_or(rows.len()).min(rows.len());
    let shown = &rows[..row_limit];

    match options.format {
        OutputFormat::Csv => {
            write_visible_csv(io::stdout().lock(), shown, &columns)?;
        }
        OutputFormat::Text => {
            let header: Vec<&str> = columns.iter().map(|f| f.label()).collect();
            println!("{}", header.join("\t"));
            println!("{}", "-".repeat(header.len() * 12));

            for row in shown {
                let values: Vec<String> = columns.iter().map(|&f| row.display_value(f)).collect();
                println!("{}", values.join("\t"));
            }

            if rows.len() > row_limit {
                println!("... ({} more rows)", rows.len() - row_limit);
            }
        }
    }

    Ok(())
}

fn cmd_add(
    file: &Path,
    settings: Option<AppSettings>,
    values: &[(Field, String)],
) -> comic_core::Result<()> {
    let mut state = open(file, settings)?;
    let record = build_record(state.settings.empty_record(), values);

    let outcome = state.dispatch(Action::AddRecord(record))?;
    state.save_to_file(file)?;

    if let Outcome::Added { uuid } = outcome {
        println!("Added record {}", uuid);
    }
    Ok(())
}

fn cmd_bulk_add(
    file: &Path,
    settings: Option<AppSettings>,
    start: &str,
    end: &str,
    values: &[(Field, String)],
    preview: bool,
) -> comic_core::Result<()> {
    if preview {
        println!("{} records would be generated", calculate_count(start, end));
        return Ok(());
    }

    let mut state = open(file, settings)?;
    let template = build_record(state.settings.empty_record(), values);

    let outcome = state.dispatch(Action::AddRange {
        template,
        start_issue: start.to_string(),
        end_issue: end.to_string(),
    })?;
    state.save_to_file(file)?;

    if let Outcome::Generated { count } = outcome {
        println!("Added {} records to {}", count, file.display());
    }
    Ok(())
}

fn cmd_batch_edit(
    file: &Path,
    settings: Option<AppSettings>,
    filter: Vec<(Field, String)>,
    or: bool,
    values: &[(Field, String)],
    clear: &[Field],
    append_comments: bool,
) -> comic_core::Result<()> {
    let mut state = open(file, settings)?;
    let selected = select_matching(&mut state, filter, or)?;
    tracing::debug!(selected, "selected records for batch edit");

    state.dispatch(Action::BeginBatchEdit)?;
    let form = batch_form(values, clear);

    let outcome = state.dispatch(Action::SaveBatch {
        form,
        append_comments,
    })?;
    state.save_to_file(file)?;

    if let Outcome::Updated { count } = outcome {
        println!("Updated {} records", count);
    }
    Ok(())
}

fn cmd_delete(
    file: &Path,
    settings: Option<AppSettings>,
    filter: Vec<(Field, String)>,
    or: bool,
) -> comic_core::Result<()> {
    let mut state = open(file, settings)?;
    select_matching(&mut state, filter, or)?;

    let outcome = state.dispatch(Action::DeleteSelected)?;
    state.save_to_file(file)?;

    if let Outcome::Deleted { count } = outcome {
        println!("Deleted {} records", count);
    }
    Ok(())
}

fn cmd_options(file: &Path, settings: Option<AppSettings>, field: Field) -> comic_core::Result<()> {
    let state = open(file, settings)?;

    for value in field_options(&state.records, field) {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_export(file: &Path, settings: Option<AppSettings>, output: &Path) -> comic_core::Result<()> {
    let state = open(file, settings)?;
    state.save_to_file(output)?;

    println!("Exported {} records to {}", state.records.len(), output.display());
    Ok(())
}

/// Batch form holding only the fields given on the command line.
///
/// Every other field is absent and therefore left untouched, so values the
/// selection already shares are never written back (or appended) again.
fn batch_form(values: &[(Field, String)], clear: &[Field]) -> FormRecord {
    let mut form = FormRecord::default();
    for &(field, ref raw) in values {
        form.set(field, form_value(field, raw));
    }
    for &field in clear {
        let value = match field.kind() {
            FieldKind::Sequence => FieldValue::List(vec![CLEAR_MARKER.to_string()]),
            FieldKind::Text | FieldKind::Numeric => FieldValue::Text(CLEAR_TEXT.to_string()),
        };
        form.set(field, value);
    }
    form
}

/// Apply command-line values to a starting record
fn build_record(mut record: Record, values: &[(Field, String)]) -> Record {
    for &(field, ref raw) in values {
        record.set(field, form_value(field, raw));
    }
    record
}

/// Interpret raw text the way the edit form would submit it
fn form_value(field: Field, raw: &str) -> FieldValue {
    match field.kind() {
        FieldKind::Sequence => FieldValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        FieldKind::Text | FieldKind::Numeric => FieldValue::Text(raw.to_string()),
    }
}

fn format_sort_key(key: &SortKey) -> String {
    match key.direction {
        SortDirection::Asc => key.key.key().to_string(),
        SortDirection::Desc => format!("{}:desc", key.key.key()),
    }
}

fn parse_field(s: &str) -> Result<Field, String> {
    Field::from_key(s.trim()).ok_or_else(|| {
        let known: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        format!("unknown field '{}' (expected one of: {})", s, known.join(", "))
    })
}

/// `field=value`; the value is kept verbatim so a single space survives
fn parse_assignment(s: &str) -> Result<(Field, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", s))?;
    Ok((parse_field(key)?, value.to_string()))
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    let (key, direction) = match s.split_once(':') {
        Some((key, "asc")) => (key, SortDirection::Asc),
        Some((key, "desc")) => (key, SortDirection::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction '{}'", other)),
        None => (s, SortDirection::Asc),
    };
    Ok(SortKey::new(parse_field(key)?, direction))
}
