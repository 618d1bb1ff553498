/*!
 * Command-line interface for treecopy
 */

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rayon::ThreadPoolBuilder;

use treecopy::config::{Args, Config};
use treecopy::logger::setup_logger;
use treecopy::report::{ExtractionReport, Reporter};
use treecopy::writer::{ContextWriter, OutputFormat};
use treecopy::{PathCompressor, Selection, TreeWalker};

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "treecopy", &mut io::stdout());
        return Ok(());
    }

    if let Err(e) = setup_logger(args.verbose) {
        eprintln!("Warning: Failed to set up logging: {}", e);
    }

    let config = Config::from_args(args);
    config.validate()?;
    debug!("Running with {:?}", config);

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("Failed to set thread pool size: {}", e);
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📂 Walking");

    let start_time = Instant::now();
    let selection = Selection::new(&config.paths)?;
    let destination = config
        .output_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());

    let format = if config.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let writer = ContextWriter::new(format);

    let (output, report) = match config.compression {
        Some(level) => {
            progress.set_message(format!("Compressing paths ({})", level));
            let compressor = PathCompressor::new(config.walk.clone());
            let candidate_root = config.candidate_root.canonicalize()?;
            let output = compressor.compress(&selection, &candidate_root, level)?;
            let report = ExtractionReport::from_listing(&output, destination, start_time.elapsed());
            (output, report)
        }
        None => {
            let walker = TreeWalker::new(config.walk.clone(), Arc::new(progress.clone()));
            let result = walker.walk(&selection, config.base_path.as_deref())?;
            let output = writer.render(&result)?;
            let report = ExtractionReport::from_traversal(
                &result,
                &output,
                destination,
                start_time.elapsed(),
            );
            (output, report)
        }
    };

    progress.finish_and_clear();
    writer.write(&output, config.output_file.as_deref())?;

    if config.report {
        Reporter::new().print_report(&report);
    }

    Ok(())
}
