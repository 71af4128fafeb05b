//! Listing commands. Missing sizes and timestamps print as `N/A`.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::output::{self, table};
use super::Session;
use crate::format::{
    composite_name, human_size_or_na, local_timestamp, location_of, repository_of, short_name,
    tag_list,
};
use crate::registry::models::{DockerImage, Package, Repository, Version};
use crate::registry::scan::{scan_repositories, LocationStatus};

pub fn repositories_table(repositories: &[Repository]) -> Table {
    let mut table = table(&["NAME", "LOCATION", "FORMAT", "SIZE", "UPDATED", "DESCRIPTION"]);
    for repo in repositories {
        table.add_row(vec![
            Cell::new(repository_of(&repo.name)),
            Cell::new(location_of(&repo.name)),
            Cell::new(repo.format),
            Cell::new(human_size_or_na(repo.size_bytes)),
            Cell::new(local_timestamp(repo.update_time)),
            Cell::new(repo.description.as_deref().unwrap_or("")),
        ]);
    }
    table
}

pub fn packages_table(packages: &[Package]) -> Table {
    let mut table = table(&["NAME", "DISPLAY NAME", "CREATED", "UPDATED"]);
    for package in packages {
        let name = short_name(&package.name);
        table.add_row(vec![
            Cell::new(name),
            Cell::new(
                package
                    .display_name
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or(name),
            ),
            Cell::new(local_timestamp(package.create_time)),
            Cell::new(local_timestamp(package.update_time)),
        ]);
    }
    table
}

pub fn versions_table(versions: &[Version]) -> Table {
    let mut table = table(&["VERSION", "DESCRIPTION", "CREATED", "UPDATED"]);
    for version in versions {
        table.add_row(vec![
            Cell::new(short_name(&version.name)),
            Cell::new(version.description.as_deref().unwrap_or("")),
            Cell::new(local_timestamp(version.create_time)),
            Cell::new(local_timestamp(version.update_time)),
        ]);
    }
    table
}

pub fn images_table(images: &[DockerImage]) -> Table {
    let mut table = table(&["IMAGE", "TAGS", "SIZE", "UPLOADED"]);
    for image in images {
        table.add_row(vec![
            Cell::new(composite_name(&image.name)),
            Cell::new(tag_list(&image.tags)),
            Cell::new(human_size_or_na(image.image_size_bytes)),
            Cell::new(local_timestamp(image.upload_time)),
        ]);
    }
    table
}

pub async fn list_repositories(session: &Session, locations: &[String]) -> Result<()> {
    let scan = scan_repositories(session.backend.as_ref(), locations).await?;

    for outcome in scan.failed_locations() {
        if let LocationStatus::Failed { message, .. } = &outcome.status {
            output::warning(format!("Skipped {}: {}", outcome.location, message));
        }
    }

    if scan.repositories.is_empty() {
        println!("No repositories found.");
    } else {
        println!("{}", repositories_table(&scan.repositories));
        output::success(format!("{} repositories", scan.repositories.len()));
    }
    Ok(())
}

pub async fn list_packages(session: &Session, location: &str, repository: &str) -> Result<()> {
    let packages = session.backend.list_packages(location, repository).await?;

    if packages.is_empty() {
        println!("No packages found in {}.", repository);
    } else {
        println!("{}", packages_table(&packages));
        output::success(format!("{} packages", packages.len()));
    }
    Ok(())
}

pub async fn list_versions(
    session: &Session,
    location: &str,
    repository: &str,
    package: &str,
) -> Result<()> {
    let versions = session
        .backend
        .list_versions(location, repository, package)
        .await?;

    if versions.is_empty() {
        println!("No versions found for {}.", package);
    } else {
        println!("{}", versions_table(&versions));
        output::success(format!("{} versions", versions.len()));
    }
    Ok(())
}

pub async fn list_images(session: &Session, location: &str, repository: &str) -> Result<()> {
    let images = session
        .backend
        .list_docker_images(location, repository)
        .await?;

    if images.is_empty() {
        println!("No Docker images found in {}.", repository);
    } else {
        println!("{}", images_table(&images));
        output::success(format!("{} images", images.len()));
    }
    Ok(())
}
