//! Label command implementation

use anyhow::Result;
use clonodef_core::compute_default_label;

pub fn execute(labels: Vec<String>) -> Result<()> {
    log::debug!("Computing default label from {} column labels", labels.len());
    println!("{}", compute_default_label(&labels));
    Ok(())
}
