use std::fmt::Display;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use craft_core::{
    ActorState, Alternatives, CheckContext, DemandStatus, InventorySnapshot, Requirement,
    RequirementDef, RequirementId, TraitId,
};
use craft_world::{
    check_consistency, default_substitutes, load_content, load_inventory, WorkshopContent,
};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "craft_cli", about = "Crafting requirement checker")]
struct Cli {
    #[arg(long, default_value = "./content", global = true)]
    content_dir: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CheckArgs {
    /// Requirement id to check.
    #[arg(long)]
    id: String,
    /// Inventory JSON file with items and actor state.
    #[arg(long)]
    inventory: String,
    #[arg(long, default_value_t = 1)]
    batch: i32,
    /// Adds a trait to the actor from the inventory file. Repeatable.
    #[arg(long = "actor-trait")]
    actor_traits: Vec<String>,
    /// Overrides the actor's hunger from the inventory file.
    #[arg(long)]
    hunger: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a requirement against an inventory and print every demand's status.
    Check(CheckArgs),
    /// Check a requirement and print only the unmet groups.
    Missing(CheckArgs),
    /// Print the disassembly requirement of a recipe as JSON.
    Disassemble {
        #[arg(long)]
        id: String,
    },
    /// Print a requirement scaled by a positive factor as JSON.
    Scale {
        #[arg(long)]
        id: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        factor: u32,
    },
    /// Print the concatenation of two or more requirements as JSON.
    Combine {
        #[arg(long = "id", required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Load content and report malformed requirements and dangling references.
    Validate,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn lookup(content: &WorkshopContent, id: &str) -> Result<Requirement> {
    let req = content.registry.get(&RequirementId::from(id))?;
    Ok(req.clone())
}

fn actor_for(args: &CheckArgs, mut actor: ActorState) -> ActorState {
    actor
        .traits
        .extend(args.actor_traits.iter().map(|t| TraitId::from(t.as_str())));
    if let Some(hunger) = args.hunger {
        actor.hunger = hunger;
    }
    actor
}

fn check(content: &WorkshopContent, args: &CheckArgs, only_missing: bool) -> Result<()> {
    if args.batch < 1 {
        bail!("--batch must be at least 1, got {}", args.batch);
    }
    let mut req = lookup(content, &args.id)?;
    let inventory = load_inventory(&args.inventory)?;
    let actor = actor_for(args, inventory.actor);
    let snapshot = InventorySnapshot::new(&inventory.items, &content.item_types);
    let substitutes = default_substitutes();
    let ctx = CheckContext::new(&snapshot, &content.item_types, &actor)
        .with_substitutes(&substitutes);

    let satisfied = req.can_satisfy(&ctx, args.batch);
    tracing::debug!(id = %args.id, batch = args.batch, satisfied, "requirement checked");
    println!(
        "{} x{}: {}",
        args.id,
        args.batch,
        if satisfied { "can craft" } else { "cannot craft" }
    );

    if only_missing {
        let missing = req.missing();
        print_missing_groups("qualities", &missing.qualities, args.batch);
        print_missing_groups("tools", &missing.tools, args.batch);
        print_missing_groups("components", &missing.components, args.batch);
    } else {
        let report = req.statuses(&ctx, args.batch);
        print_statuses("qualities", &req.qualities, &report.qualities);
        print_statuses("tools", &req.tools, &report.tools);
        print_statuses("components", &req.components, &report.components);
    }
    Ok(())
}

fn status_label(status: DemandStatus) -> &'static str {
    match status {
        DemandStatus::Available => "ok",
        DemandStatus::AlternativeAvailable => "alt",
        DemandStatus::Insufficient => "short",
        DemandStatus::Unavailable => "missing",
    }
}

fn print_statuses<T: Display>(
    label: &str,
    groups: &[Alternatives<T>],
    statuses: &[Vec<DemandStatus>],
) {
    if groups.is_empty() {
        return;
    }
    println!("{label}:");
    for (group, group_statuses) in groups.iter().zip(statuses) {
        let line: Vec<String> = group
            .iter()
            .zip(group_statuses)
            .map(|(demand, status)| format!("{demand} [{}]", status_label(*status)))
            .collect();
        println!("  {}", line.join(" OR "));
    }
}

fn print_missing_groups<T: Display>(label: &str, groups: &[&[T]], batch: i32) {
    if groups.is_empty() {
        return;
    }
    println!("missing {label} (batch {batch}):");
    for group in groups {
        let line: Vec<String> = group.iter().map(ToString::to_string).collect();
        println!("  {}", line.join(" OR "));
    }
}

// ---------------------------------------------------------------------------
// Derived requirements
// ---------------------------------------------------------------------------

fn print_requirement(req: &Requirement) -> Result<()> {
    let def = RequirementDef::from(req);
    let json = serde_json::to_string_pretty(&def).context("serializing requirement")?;
    println!("{json}");
    Ok(())
}

fn combine(content: &WorkshopContent, ids: &[String]) -> Result<Requirement> {
    let Some((first, rest)) = ids.split_first() else {
        bail!("no requirement ids given");
    };
    let mut combined = lookup(content, first)?;
    for id in rest {
        combined = combined.combined(&lookup(content, id)?);
    }
    Ok(combined)
}

fn validate(content: &WorkshopContent) -> Result<()> {
    let findings = check_consistency(content);
    println!(
        "content {}: {} requirements, {} item types, {} rejected, {} dangling references",
        content.content_version,
        content.registry.len(),
        content.item_types.len(),
        content.rejected.len(),
        findings,
    );
    for err in &content.rejected {
        println!("  rejected: {err}");
    }
    if findings > 0 || !content.rejected.is_empty() {
        bail!("content has problems");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let content = load_content(&cli.content_dir)?;
    match cli.command {
        Commands::Check(args) => check(&content, &args, false)?,
        Commands::Missing(args) => check(&content, &args, true)?,
        Commands::Disassemble { id } => {
            let req = lookup(&content, &id)?;
            print_requirement(&req.disassembly(&content.item_types))?;
        }
        Commands::Scale { id, factor } => {
            let req = lookup(&content, &id)?;
            print_requirement(&req.scaled(factor))?;
        }
        Commands::Combine { ids } => print_requirement(&combine(&content, &ids)?)?,
        Commands::Validate => validate(&content)?,
    }
    Ok(())
}
