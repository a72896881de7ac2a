//! List-segments command - show every segment and its handle state

use crate::cli::output::{colors, print_header};
use crate::cli::OutputFormat;
use crate::core::segment::{HandleSnapshot, MetricsSnapshot};
use crate::core::services::Services;
use crate::core::storage::SegmentStats;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the list-segments command
#[derive(Args, Debug)]
pub struct ListSegmentsArgs {
    /// Index directory (defaults to storage.index_dir)
    #[arg(long, short = 'i')]
    pub index_dir: Option<PathBuf>,
}

/// One listed segment
#[derive(Debug, Serialize)]
pub struct SegmentItem {
    pub handle: HandleSnapshot,
    pub stats: SegmentStats,
}

/// List-segments response
#[derive(Debug, Serialize)]
pub struct ListSegmentsResponse {
    pub index_dir: String,
    pub count: usize,
    pub segments: Vec<SegmentItem>,
    pub metrics: MetricsSnapshot,
}

/// Execute the list-segments command
pub async fn execute(
    args: ListSegmentsArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = services.open_catalog(args.index_dir.as_deref())?;

    let mut segments = Vec::new();
    for lease in catalog.leases()? {
        let stats = lease.stats()?;
        // Snapshot while leased so the borrower shows up.
        let snapshot = lease.handle().snapshot();
        lease.release()?;
        segments.push(SegmentItem {
            handle: snapshot,
            stats,
        });
    }

    let response = ListSegmentsResponse {
        index_dir: catalog.index_dir().display().to_string(),
        count: segments.len(),
        segments,
        metrics: services.registry.metrics(),
    };

    match format {
        OutputFormat::Human => {
            print_header(&format!("Segments in {}", response.index_dir));
            if response.segments.is_empty() {
                println!("  {}", colors::dim("(no segments)"));
            }
            for item in &response.segments {
                println!(
                    "  {}  docs {}  deleted {}  refs {}",
                    colors::segment_id(&item.handle.id),
                    colors::number(&item.stats.num_docs.to_string()),
                    colors::number(&item.stats.num_deleted_docs.to_string()),
                    item.handle.reference_count,
                );
            }
            println!(
                "{} segment(s), {} handle(s) created",
                response.count, response.metrics.created
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
