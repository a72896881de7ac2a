//! CLI test helpers
//!
//! Arc<Services> wrappers matching CLI execute() signatures, pointed at
//! a freshly built tantivy index.

use crate::common::TestIndex;
use segref::core::config::Config;
use segref::core::services::Services;
use std::sync::Arc;

/// Create test services whose configured index dir holds `index`
pub fn create_cli_test_services(index: &TestIndex) -> Arc<Services> {
    let mut config = Config::default();
    config.storage.index_dir = index.dir.path().to_path_buf();

    Arc::new(Services::new(config))
}
