//! Entry point for the XLIFF/spreadsheet sync command.

use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::Parser;
use ngx_xlf_xlsx::sync::{
    self,
    SyncOptions,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Sync the translations of an Angular project between its XLIFF files and an Excel workbook.
///
/// The source XLIFF file (from `ng extract-i18n`) decides which keys exist;
/// the workbook provides the translations of the other locales.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Root of the Angular workspace
    #[arg(long, short, default_value = ".")]
    workspace: PathBuf,

    /// Workspace configuration file, relative to the workspace root
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Project to sync (default: the first application project)
    #[arg(long, short)]
    project: Option<String>,

    /// Translations workbook, relative to the workspace root
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Source XLIFF file, relative to the workspace root
    #[arg(long)]
    source_xlf: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            config_path: self.config.clone(),
            project: self.project.clone(),
            xlsx_path: self.xlsx.clone(),
            source_xliff_path: self.source_xlf.clone(),
            ..SyncOptions::new(&self.workspace)
        }
    }
}

/// Installs the subscriber. The returned guard flushes the log file on drop.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let default_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = cli
        .log_file
        .as_deref()
        .map(|path| {
            let directory = path.parent().filter(|parent| !parent.as_os_str().is_empty());
            let file_name = path.file_name().unwrap_or(path.as_os_str());
            let appender =
                tracing_appender::rolling::never(directory.unwrap_or_else(|| Path::new(".")), file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false), guard)
        })
        .unzip();

    tracing_subscriber::registry().with(filter).with(stderr_layer).with(file_layer).init();
    guard
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli);

    tracing::info!("ngx-xlf-xlsx {}", env!("CARGO_PKG_VERSION"));

    match sync::run(&cli.sync_options()) {
        Ok(report) => {
            tracing::info!(
                keys = report.exported_keys,
                xliff_files = report.written.len(),
                "Done! Excel file is at: {}",
                report.xlsx_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
