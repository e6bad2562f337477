//! `nova onboard`: first-time setup.

use nova_config::AppConfig;
use std::path::Path;

pub fn run(path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = super::config_path(path);

    println!("🎓 Nova: First-Time Setup");
    println!("=========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        } else {
            println!("  Config directory exists: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Get a Gemini API key at https://aistudio.google.com/apikey");
    println!("   2. Set GOOGLE_API_KEY (or NOVA_API_KEY), or add api_key to the config");
    println!("   3. Run: nova chat");
    println!();
    Ok(())
}
