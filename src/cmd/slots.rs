use std::path::Path;

use anyhow::Result;

use timegrid::ParserConfig;

pub fn cmd_slots(config: Option<&Path>, as_toml: bool) -> Result<()> {
    let config = ParserConfig::load(config)?;
    if as_toml {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    for (idx, slot) in config.slots.iter().enumerate() {
        println!("{:>2}. {}-{}", idx + 1, slot.start, slot.end);
    }
    Ok(())
}
