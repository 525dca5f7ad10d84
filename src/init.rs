//! `syncsite init`: write a default config into the project root.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Write `syncsite.toml` with every default spelled out.
///
/// Refuses to overwrite an existing config file.
pub fn new_site(config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let config_path = &config.config_path;
    if config_path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            config_path.display()
        );
    }

    fs::create_dir_all(root).with_context(|| format!("Failed to create {}", root.display()))?;

    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    init_ignored_files(
        root,
        &[config.build.output.as_path(), config.build.state_dir.as_path()],
    )?;

    log!("init"; "wrote {}", config_path.display());
    log!("init"; "set CONTENT_SPACE_ID and CONTENT_DELIVERY_ACCESS_TOKEN, then run `syncsite build`");
    Ok(())
}

/// Ignore generated paths; existing ignore files are left alone.
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p))
        .filter_map(|p| p.to_str())
        .map(|p| format!("/{p}/\n"))
        .collect::<String>();

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    Ok(())
}
