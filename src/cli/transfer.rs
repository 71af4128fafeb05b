use anyhow::Result;

use super::output;
use crate::api::models::TransferPlan;
use crate::registry::CredentialBundle;
use crate::transfer::{generate_transfer_plan, TransferRequest};

#[derive(Debug, Clone, clap::Args)]
pub struct TransferArgs {
    /// Public image to copy, e.g. `nginx` or `bitnami/redis`
    pub source_image: String,
    /// Tag to copy
    #[arg(long, short)]
    pub tag: Option<String>,
    /// Destination Artifact Registry repository
    #[arg(long, short = 'r')]
    pub repository: String,
    /// Location of the destination repository
    #[arg(long, short = 'l')]
    pub location: String,
    /// Image name inside the destination repository (defaults to the source name)
    #[arg(long)]
    pub name: Option<String>,
    /// Print the commands as one shell line
    #[arg(long)]
    pub script: bool,
}

impl From<&TransferArgs> for TransferRequest {
    fn from(args: &TransferArgs) -> Self {
        TransferRequest {
            source_image: Some(args.source_image.clone()),
            source_tag: args.tag.clone(),
            target_repository: Some(args.repository.clone()),
            target_location: Some(args.location.clone()),
            target_name: args.name.clone(),
        }
    }
}

pub fn print_plan(plan: &TransferPlan) {
    println!("Transfer {} → {}", plan.summary.source, plan.summary.target);
    println!();
    for step in &plan.steps {
        println!("{}. {}", step.step, step.title);
        println!("   $ {}", step.command);
        println!("   {}", step.description);
        println!();
    }
}

pub fn handle_transfer(
    bundle: &CredentialBundle,
    request: &TransferRequest,
    script: bool,
) -> Result<()> {
    let plan = generate_transfer_plan(request, Some(bundle))?;

    if script {
        println!("{}", plan.script());
    } else {
        print_plan(&plan);
        output::success("Run the commands above in order");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_map_to_request() {
        let args = TransferArgs {
            source_image: "nginx".to_string(),
            tag: None,
            repository: "my-repo".to_string(),
            location: "us-central1".to_string(),
            name: Some("web".to_string()),
            script: false,
        };
        let request = TransferRequest::from(&args);
        assert_eq!(request.source_image.as_deref(), Some("nginx"));
        assert_eq!(request.source_tag, None);
        assert_eq!(request.target_name.as_deref(), Some("web"));
    }
}
