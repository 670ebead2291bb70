//! Region discovery command

use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Region, matching_regions};
use crate::error::Result;
use crate::output::{json, table};

/// Region for table display
#[derive(Tabled)]
struct RegionDisplay {
    #[tabled(rename = "REGION")]
    name: String,
}

impl From<Region> for RegionDisplay {
    fn from(region: Region) -> Self {
        Self { name: region.name }
    }
}

/// Run the regions command
pub async fn list(ctx: &CommandContext, prefix: Option<&str>) -> Result<()> {
    let prefix = prefix.unwrap_or(&ctx.config.region_prefix);
    let regions = matching_regions(ctx.client.as_ref(), prefix).await?;

    match ctx.format {
        OutputFormat::Table => {
            let display: Vec<RegionDisplay> =
                regions.into_iter().map(RegionDisplay::from).collect();
            println!("{}", table::format_table(&display));
        }
        OutputFormat::Json => {
            let names: Vec<&str> = regions.iter().map(|r| r.name.as_str()).collect();
            println!("{}", json::format_json(&names)?);
        }
    }

    Ok(())
}
