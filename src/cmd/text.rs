use std::path::Path;

use anyhow::Result;

use timegrid::layout_text;
use timegrid::ParserConfig;

use super::input_runs;

pub async fn cmd_text(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = ParserConfig::load(config)?;
    let runs = input_runs(input).await?;
    println!("{}", layout_text::render(&runs, config.layout.line_tolerance));
    Ok(())
}
