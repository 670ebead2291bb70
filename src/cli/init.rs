//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::client::{GuardClient, matching_regions};
use crate::config::{Config, DEFAULT_API_HOST, DEFAULT_REGION_PREFIX};
use crate::error::Result;

/// Run the init command
///
/// Prompts for the API token and endpoint, verifies them with one
/// region-listing call, and writes the config file.
pub async fn run(api_host: Option<&str>, config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to Guardex!".bold().green());
    println!("Let's set up your threat-detection service configuration.\n");

    let api_token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your API token")
        .interact()?;

    let default_host = api_host.unwrap_or(DEFAULT_API_HOST).to_string();
    let host: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Service endpoint template ({region} is substituted per call)")
        .default(default_host)
        .interact_text()?;

    let prefix: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Region prefix for discovery")
        .default(DEFAULT_REGION_PREFIX.to_string())
        .interact_text()?;

    let config = Config {
        api_token: Some(api_token.clone()),
        api_host: host,
        region_prefix: prefix,
        ..Config::default()
    };

    println!("\n{}", "Verifying access...".cyan());
    let client = GuardClient::new(
        config.api_host.clone(),
        config.home_region.clone(),
        api_token,
    )?;
    let regions = matching_regions(&client, &config.region_prefix).await?;

    println!(
        "{} Found {} region(s) matching `{}`",
        "✓".green(),
        regions.len(),
        config.region_prefix
    );

    if regions.is_empty() {
        println!(
            "{}",
            "⚠ No regions matched; check the prefix before exporting.".yellow()
        );
    }

    config.save_at(config_path)?;
    let path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );

    Ok(())
}
