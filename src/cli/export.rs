//! Export command: one bounded collection pass over the selected regions

use std::path::PathBuf;

use chrono::Local;
use colored::Colorize;
use log::debug;

use crate::cli::{CommandContext, ExportArgs};
use crate::client::matching_regions;
use crate::error::{ExportError, Result};
use crate::export::{
    CancelFlag, ConsoleProgress, CsvSink, ExportOptions, Exporter, timestamped_path,
};

/// Run the export command
pub async fn run(ctx: &CommandContext, args: &ExportArgs) -> Result<()> {
    let regions: Vec<String> = if args.all {
        let prefix = args.prefix.as_deref().unwrap_or(&ctx.config.region_prefix);
        matching_regions(ctx.client.as_ref(), prefix)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect()
    } else {
        args.regions.clone()
    };

    // Reject before creating the artifact or touching the service.
    if regions.is_empty() {
        return Err(ExportError::EmptySelection.into());
    }

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| ctx.config.preferences.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let path = timestamped_path(&output_dir, Local::now());
    let mut sink = CsvSink::create(&path)?;

    // Ctrl-C stops the export at the next remote-call boundary.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut options = ExportOptions::new(regions);
    options.parallelism = args.parallel.max(1);
    options.keep_going = args.keep_going;

    println!(
        "Exporting findings from {} region(s) to {}",
        options.regions.len(),
        path.display().to_string().cyan()
    );
    debug!("selected regions: {:?}", options.regions);

    let progress = ConsoleProgress::new();
    let exporter = Exporter::new(ctx.client.as_ref(), &progress).with_cancel(cancel);

    match exporter.run(&mut sink, &options).await {
        Ok(summary) => {
            progress.finish(format!("{} finding(s) exported", summary.rows_written));

            println!(
                "\n{} Exported {} finding(s) to {}",
                "✓".green(),
                summary.rows_written,
                summary.sink_name.cyan()
            );

            for failure in &summary.region_failures {
                println!(
                    "{} {} failed: {}",
                    "⚠".yellow(),
                    failure.region,
                    failure.error
                );
            }

            Ok(())
        }
        Err(failure) => {
            progress.finish("export aborted");

            eprintln!(
                "{} Export aborted after {} row(s); partial artifact at {}",
                "✗".red(),
                failure.rows_written,
                path.display()
            );

            Err(failure.error)
        }
    }
}
