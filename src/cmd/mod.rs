pub mod parse;
mod runs;
mod slots;
mod text;

use std::path::Path;

use anyhow::{bail, Context, Result};

use timegrid::PositionedText;

pub use parse::cmd_parse;
pub use runs::cmd_runs;
pub use slots::cmd_slots;
pub use text::cmd_text;

/// A command input: extracted runs, or raw PDF bytes still to decode.
pub enum Input {
    Runs(Vec<PositionedText>),
    Pdf(Vec<u8>),
}

/// Read `path`; `.json` files are runs, anything else is a PDF.
pub fn read_input(path: &Path) -> Result<Input> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let runs = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a runs JSON array", path.display()))?;
        return Ok(Input::Runs(runs));
    }
    Ok(Input::Pdf(bytes))
}

/// Runs for `path`, decoding PDFs on the blocking pool.
pub async fn input_runs(path: &Path) -> Result<Vec<PositionedText>> {
    match read_input(path)? {
        Input::Runs(runs) => Ok(runs),
        Input::Pdf(bytes) => decode_pdf(bytes).await,
    }
}

#[cfg(feature = "pdf")]
async fn decode_pdf(bytes: Vec<u8>) -> Result<Vec<PositionedText>> {
    let runs = tokio::task::spawn_blocking(move || timegrid::extract::extract_runs(&bytes)).await??;
    Ok(runs)
}

#[cfg(not(feature = "pdf"))]
async fn decode_pdf(_bytes: Vec<u8>) -> Result<Vec<PositionedText>> {
    bail!("built without PDF support; pass a runs JSON file instead")
}

/// Serialize `value` as pretty or compact JSON.
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

/// Reject a non-PDF path for commands that only read PDFs.
pub fn require_pdf(path: &Path) -> Result<()> {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        bail!("{} is already a runs file", path.display());
    }
    Ok(())
}
