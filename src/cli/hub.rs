use anyhow::Result;
use comfy_table::Cell;

use super::output::{self, table};
use crate::format::{human_size_or_na, local_timestamp};
use crate::hub::{popular_images, split_image_name, HubClient};

#[derive(Debug, Clone, clap::Subcommand)]
pub enum HubCommands {
    /// Search public images
    #[command(visible_alias = "s")]
    Search {
        query: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List tags of a public image (e.g. `nginx` or `bitnami/redis`)
    #[command(visible_alias = "t")]
    Tags {
        image: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show a curated list of popular images
    Popular,
}

pub async fn handle_hub_command(hub: &HubClient, cmd: &HubCommands) -> Result<()> {
    match cmd {
        HubCommands::Search {
            query,
            page,
            page_size,
        } => search(hub, query, *page, *page_size).await,
        HubCommands::Tags {
            image,
            page,
            page_size,
        } => tags(hub, image, *page, *page_size).await,
        HubCommands::Popular => {
            popular();
            Ok(())
        }
    }
}

pub async fn search(
    hub: &HubClient,
    query: &str,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<()> {
    let result = hub.search(query, page, page_size).await?;

    if result.results.is_empty() {
        println!("No images found for '{}'.", query.trim());
        return Ok(());
    }

    let mut table = table(&["NAME", "DESCRIPTION", "STARS", "PULLS", "OFFICIAL"]);
    for entry in &result.results {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(&entry.description),
            Cell::new(entry.star_count),
            Cell::new(entry.pull_count),
            Cell::new(if entry.is_official { "yes" } else { "" }),
        ]);
    }
    println!("{}", table);

    let pages = result.count.div_ceil(u64::from(result.page_size)).max(1);
    output::success(format!(
        "{} results, page {} of {}",
        result.count, result.page, pages
    ));
    Ok(())
}

pub async fn tags(
    hub: &HubClient,
    image: &str,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<()> {
    let (namespace, repository) = split_image_name(image);
    let result = hub.list_tags(namespace, repository, page, page_size).await?;

    if result.tags.is_empty() {
        println!("No tags found for {}.", image);
        return Ok(());
    }

    let mut table = table(&["TAG", "SIZE", "LAST UPDATED"]);
    for tag in &result.tags {
        table.add_row(vec![
            Cell::new(&tag.name),
            Cell::new(human_size_or_na(tag.full_size)),
            Cell::new(local_timestamp(tag.last_updated)),
        ]);
    }
    println!("{}", table);
    output::success(format!("{} tags (page {})", result.count, result.page));
    Ok(())
}

pub fn popular() {
    let mut table = table(&["NAME", "CATEGORY", "DESCRIPTION"]);
    for image in popular_images() {
        table.add_row(vec![image.name, image.category, image.description]);
    }
    println!("{}", table);
}
