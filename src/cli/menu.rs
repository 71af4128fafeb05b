//! Interactive menu.
//!
//! The menu is a small state machine: [`Screen::MainMenu`] reads a choice,
//! [`Screen::from_choice`] maps it to an action screen, the action runs, and
//! [`Screen::after_action`] either returns to the main menu or exits.
//! A failed action prints a failure line and still asks whether to continue.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use super::{account, hub, output, registry, transfer, CliContext, Session};
use crate::transfer::TransferRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Repositories,
    Packages,
    Versions,
    Images,
    HubSearch,
    HubTags,
    Transfer,
    Account,
    Exit,
}

/// Main menu entries in display order
const MENU: &[(&str, Screen, &str)] = &[
    ("1", Screen::Repositories, "List repositories"),
    ("2", Screen::Packages, "List packages in a repository"),
    ("3", Screen::Versions, "List versions of a package"),
    ("4", Screen::Images, "List Docker images in a repository"),
    ("5", Screen::HubSearch, "Search Docker Hub"),
    ("6", Screen::HubTags, "List tags of a Docker Hub image"),
    ("7", Screen::Transfer, "Transfer a Docker Hub image"),
    ("8", Screen::Account, "Show account"),
    ("0", Screen::Exit, "Exit"),
];

impl Screen {
    /// Screen selected by a main menu answer
    pub fn from_choice(choice: &str) -> Option<Screen> {
        let choice = choice.trim();
        if choice.eq_ignore_ascii_case("q") {
            return Some(Screen::Exit);
        }
        MENU.iter()
            .find(|(key, _, _)| *key == choice)
            .map(|(_, screen, _)| *screen)
    }

    /// Where to go once an action screen has finished
    pub fn after_action(keep_going: bool) -> Screen {
        if keep_going {
            Screen::MainMenu
        } else {
            Screen::Exit
        }
    }
}

/// Source of operator answers. `None` means input is closed.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Yes/no question; an empty answer counts as yes
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [Y/n]", question))?;
        Ok(match answer {
            None => false,
            Some(a) => {
                let a = a.trim().to_ascii_lowercase();
                a.is_empty() || a == "y" || a == "yes"
            }
        })
    }
}

/// Prompts on stdout, answers from stdin
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{} ", question);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn print_menu() {
    println!();
    println!("Artifact Browser");
    for (key, _, label) in MENU {
        println!("  {}) {}", key, label);
    }
}

/// Ask a question that needs a non-empty answer
fn required(prompter: &mut dyn Prompter, question: &str) -> Result<Option<String>> {
    loop {
        match prompter.ask(question)? {
            None => return Ok(None),
            Some(answer) if !answer.trim().is_empty() => return Ok(Some(answer)),
            Some(_) => output::failure("A value is required"),
        }
    }
}

fn optional(prompter: &mut dyn Prompter, question: &str) -> Result<Option<String>> {
    Ok(prompter.ask(question)?.filter(|a| !a.trim().is_empty()))
}

/// Run the action behind an action screen. `Ok(false)` means input closed
/// while collecting its parameters.
async fn perform(
    screen: Screen,
    ctx: &CliContext,
    session: &Session,
    prompter: &mut dyn Prompter,
) -> Result<bool> {
    match screen {
        Screen::Repositories => registry::list_repositories(session, &ctx.locations).await?,
        Screen::Packages | Screen::Images => {
            let Some(location) = required(prompter, "Location:")? else {
                return Ok(false);
            };
            let Some(repository) = required(prompter, "Repository:")? else {
                return Ok(false);
            };
            if screen == Screen::Packages {
                registry::list_packages(session, &location, &repository).await?;
            } else {
                registry::list_images(session, &location, &repository).await?;
            }
        }
        Screen::Versions => {
            let Some(location) = required(prompter, "Location:")? else {
                return Ok(false);
            };
            let Some(repository) = required(prompter, "Repository:")? else {
                return Ok(false);
            };
            let Some(package) = required(prompter, "Package:")? else {
                return Ok(false);
            };
            registry::list_versions(session, &location, &repository, &package).await?;
        }
        Screen::HubSearch => {
            let Some(query) = required(prompter, "Search query:")? else {
                return Ok(false);
            };
            hub::search(&ctx.hub, &query, None, None).await?;
        }
        Screen::HubTags => {
            let Some(image) = required(prompter, "Image (e.g. nginx or bitnami/redis):")? else {
                return Ok(false);
            };
            hub::tags(&ctx.hub, &image, None, None).await?;
        }
        Screen::Transfer => {
            let Some(source_image) = required(prompter, "Source image:")? else {
                return Ok(false);
            };
            let source_tag = optional(prompter, "Tag [latest]:")?;
            let Some(target_repository) = required(prompter, "Target repository:")? else {
                return Ok(false);
            };
            let Some(target_location) = required(prompter, "Target location:")? else {
                return Ok(false);
            };
            let target_name = optional(prompter, "Target image name [same as source]:")?;

            let request = TransferRequest {
                source_image: Some(source_image),
                source_tag,
                target_repository: Some(target_repository),
                target_location: Some(target_location),
                target_name,
            };
            transfer::handle_transfer(&session.bundle, &request, false)?;
        }
        Screen::Account => account::show_account(&session.bundle),
        Screen::MainMenu | Screen::Exit => {}
    }
    Ok(true)
}

/// Drive the menu until the operator exits or input closes
pub async fn run_menu(
    ctx: &CliContext,
    session: &Session,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let mut screen = Screen::MainMenu;

    loop {
        screen = match screen {
            Screen::Exit => break,
            Screen::MainMenu => {
                print_menu();
                match prompter.ask("Choose an option:")? {
                    None => Screen::Exit,
                    Some(choice) => Screen::from_choice(&choice).unwrap_or_else(|| {
                        output::failure(format!("Invalid choice '{}'", choice.trim()));
                        Screen::MainMenu
                    }),
                }
            }
            action => {
                tracing::debug!(screen = ?action, "Running menu action");
                match perform(action, ctx, session, prompter).await {
                    Ok(false) => Screen::Exit,
                    Ok(true) => Screen::after_action(prompter.confirm("Continue?")?),
                    Err(e) => {
                        output::failure(format!("{:#}", e));
                        Screen::after_action(prompter.confirm("Continue?")?)
                    }
                }
            }
        };
    }

    println!("Goodbye.");
    Ok(())
}
