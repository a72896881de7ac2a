//! Doc-freq command - document frequency of a term over leased segments

use crate::cli::output::{colors, print_header};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the doc-freq command
#[derive(Args, Debug)]
pub struct DocFreqArgs {
    /// Indexed text field to look the term up in
    #[arg(long, short = 'f')]
    pub field: String,

    /// Term, exactly as indexed (already tokenized)
    #[arg(long, short = 't')]
    pub term: String,

    /// Index directory (defaults to storage.index_dir)
    #[arg(long, short = 'i')]
    pub index_dir: Option<PathBuf>,
}

/// Doc-freq response
#[derive(Debug, Serialize)]
pub struct DocFreqResponse {
    pub field: String,
    pub term: String,
    pub segments: usize,
    pub doc_freq: u64,
}

/// Execute the doc-freq command
pub async fn execute(
    args: DocFreqArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = services.open_catalog(args.index_dir.as_deref())?;
    let doc_freq = catalog.doc_freq(&args.field, &args.term)?;

    let response = DocFreqResponse {
        segments: catalog.handles().len(),
        field: args.field,
        term: args.term,
        doc_freq,
    };

    match format {
        OutputFormat::Human => {
            print_header(&format!("{}:{}", response.field, response.term));
            println!(
                "  {} document(s) across {} segment(s)",
                colors::number(&response.doc_freq.to_string()),
                response.segments
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
