use anyhow::Result;
use yansi::Paint;

use crate::config::{self, Config};

pub fn show_config(config: &Config, init: bool) -> Result<()> {
    if init {
        let path = config::initialize_config()?;
        eprintln!("Config file: {}", path.display());
    }

    let default_path = config::default_config_path()?;
    if default_path.exists() {
        println!("# config file: {}", default_path.display());
    } else {
        println!(
            "# {} {}",
            "no config file, using defaults (create one with `binder config --init`):".yellow(),
            default_path.display()
        );
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
