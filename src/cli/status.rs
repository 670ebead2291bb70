//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "Guardex Configuration Status".bold());

    match Config::load_at(config_path) {
        Ok(config) => {
            let path = Config::resolve_path(config_path)?;
            println!("Config file: {}", path.display().to_string().cyan());
            println!();

            if config.api_token.as_deref().is_some_and(|t| !t.is_empty()) {
                println!("{} API token configured", "✓".green());
            } else {
                println!("{} API token not configured", "✗".red());
                println!("  → Run 'guardex init' to configure");
            }

            println!("{} Endpoint template: {}", "✓".green(), config.api_host);
            println!("{} Home region: {}", "✓".green(), config.home_region);
            println!("{} Region prefix: {}", "✓".green(), config.region_prefix);

            if let Some(ref dir) = config.preferences.output_dir {
                println!("{} Output directory: {}", "✓".green(), dir.display());
            } else {
                println!(
                    "{} Output directory: current directory",
                    "○".dimmed()
                );
            }
        }
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            println!("\nRun '{}' to get started.", "guardex init".bold());
        }
    }

    Ok(())
}
