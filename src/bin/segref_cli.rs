//! segref CLI - inspect segment handles of a tantivy index
//!
//! # Examples
//!
//! ```bash
//! # List segments and their handle state
//! segref list-segments --index-dir /path/to/index
//!
//! # Document frequency of a term across all segments
//! segref doc-freq --field body --term search --index-dir /path/to/index
//!
//! # Show configuration
//! segref show-config
//! ```

use clap::Parser;
use segref::cli::output::print_error;
use segref::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
