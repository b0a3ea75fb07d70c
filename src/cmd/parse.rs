use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use timegrid::{ParserConfig, TimetableParser};

use super::{read_input, to_json, Input};

/// Flags of `timegrid parse`.
pub struct ParseOptions {
    pub config: Option<PathBuf>,
    pub no_refine: bool,
    pub timeout: Option<u64>,
    pub output: Option<PathBuf>,
    pub compact: bool,
}

pub async fn cmd_parse(input: &Path, options: ParseOptions) -> Result<()> {
    let mut config = ParserConfig::load(options.config.as_deref())?;
    if options.no_refine {
        config.refine.enabled = false;
    }

    let mut parser = TimetableParser::from_config(Arc::new(config));
    if let Some(secs) = options.timeout {
        parser = parser.with_timeout(Duration::from_secs(secs));
    }
    tracing::debug!("Using {} refiner", parser.refiner_name());

    let result = match read_input(input)? {
        Input::Runs(runs) => parser.parse_runs(runs).await,
        Input::Pdf(bytes) => parse_pdf(&parser, bytes).await?,
    }
    .with_context(|| format!("failed to parse {}", input.display()))?;

    let json = to_json(&result, options.compact)?;
    match options.output {
        Some(path) => {
            std::fs::write(&path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} entries to {}",
                result.final_entry_count,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(feature = "pdf")]
async fn parse_pdf(
    parser: &TimetableParser,
    bytes: Vec<u8>,
) -> Result<Result<timegrid::ExtractionResult, timegrid::ParseError>> {
    Ok(parser.parse_pdf(bytes).await)
}

#[cfg(not(feature = "pdf"))]
async fn parse_pdf(
    _parser: &TimetableParser,
    _bytes: Vec<u8>,
) -> Result<Result<timegrid::ExtractionResult, timegrid::ParseError>> {
    anyhow::bail!("built without PDF support; pass a runs JSON file instead")
}
