use std::path::Path;

use anyhow::Result;

use super::{input_runs, require_pdf, to_json};

pub async fn cmd_runs(input: &Path, compact: bool) -> Result<()> {
    require_pdf(input)?;
    let runs = input_runs(input).await?;
    if runs.is_empty() {
        tracing::warn!("{} has no text layer", input.display());
    }
    println!("{}", to_json(&runs, compact)?);
    Ok(())
}
