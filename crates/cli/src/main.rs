mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use console::{Gate, NavigationContext, SessionState};
use policy::{Actor, Capability, Decision, Permissions, ProjectRole, Resource, evaluate};
use storage::{AuditEvent, AuditStore, Outcome};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "warden.toml";

/// Exit code for a check that ran and was denied.
const EXIT_DENIED: u8 = 2;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Capability checks for the project console", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a check from raw inputs
    Check {
        /// The actor is an administrator
        #[arg(long)]
        admin: bool,
        /// Actor mask: integer, 0x-hex, or comma-separated capability names
        #[arg(short, long, value_parser = parse_mask)]
        mask: Option<Permissions>,
        /// Resource override mask; omit for no override
        #[arg(short, long, value_parser = parse_mask)]
        resource_mask: Option<Permissions>,
        /// Required capabilities (all must be held)
        #[arg(required = true)]
        capabilities: Vec<Capability>,
    },
    /// Evaluate a check for a configured user on a console path
    Route {
        /// User id from the config
        #[arg(short, long)]
        user: u64,
        /// Console path, e.g. /project/3/templates/9
        #[arg(short, long)]
        path: String,
        /// Required capabilities (all must be held)
        #[arg(required = true)]
        capabilities: Vec<Capability>,
    },
    /// List built-in and configured roles
    Roles {
        /// Include roles owned by this project
        #[arg(short, long)]
        project: Option<u64>,
    },
    /// Show recorded checks
    Audit {
        /// Show only the last N checks
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only denied checks
        #[arg(long)]
        denied: bool,
        /// Only checks by this actor
        #[arg(short, long)]
        actor: Option<String>,
        /// Per-actor totals instead of individual checks
        #[arg(long)]
        summary: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    init_tracing(&config);

    debug!(path = %cli.config.display(), "configuration loaded");

    match cli.command {
        Commands::Check {
            admin,
            mask,
            resource_mask,
            capabilities,
        } => Ok(exit_code(&cmd_check(admin, mask, resource_mask, &capabilities))),
        Commands::Route {
            user,
            path,
            capabilities,
        } => cmd_route(&config, user, &path, &capabilities),
        Commands::Roles { project } => {
            cmd_roles(&config, project);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Audit {
            limit,
            denied,
            actor,
            summary,
        } => {
            cmd_audit(&config, limit, denied, actor.as_deref(), summary)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_mask(s: &str) -> std::result::Result<Permissions, policy::Error> {
    Permissions::parse(s)
}

fn cmd_check(
    admin: bool,
    mask: Option<Permissions>,
    resource_mask: Option<Permissions>,
    capabilities: &[Capability],
) -> Decision {
    let actor = Actor {
        is_admin: admin,
        permissions: mask.unwrap_or_default(),
    };
    let resource = Resource::from(resource_mask);
    let required: Permissions = capabilities.iter().copied().collect();

    let decision = evaluate(&actor, &resource, required);
    print_decision(&decision);
    decision
}

fn cmd_route(
    config: &Config,
    user_id: u64,
    path: &str,
    capabilities: &[Capability],
) -> Result<ExitCode> {
    let decision = route_decision(config, user_id, path, capabilities)?;
    print_decision(&decision);
    Ok(exit_code(&decision))
}

fn route_decision(
    config: &Config,
    user_id: u64,
    path: &str,
    capabilities: &[Capability],
) -> Result<Decision> {
    let user = config
        .user(user_id)
        .cloned()
        .ok_or(Error::UnknownUser { id: user_id })?;
    let ctx = NavigationContext::parse(path)?;
    let required: Permissions = capabilities.iter().copied().collect();

    let mut gate = Gate::new(SessionState::Authenticated(user), config.directory()?);
    if config.audit.enabled {
        let audit_path = config.audit_path();
        if let Some(parent) = audit_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!(path = %audit_path.display(), "recording checks");
        gate = gate.with_audit(AuditStore::open(&audit_path)?);
    }

    println!("scope: {}", ctx.scope);
    Ok(gate.decide(&ctx, required)?)
}

fn cmd_roles(config: &Config, project: Option<u64>) {
    println!("{:<20}  {:<24}  {:<10}  PERMISSIONS", "SLUG", "NAME", "SCOPE");
    println!("{}", "-".repeat(80));

    for role in ProjectRole::ALL {
        println!(
            "{:<20}  {:<24}  {:<10}  {}",
            role.slug(),
            "(built-in)",
            "builtin",
            role.permissions()
        );
    }

    for role in config.catalog.roles_for(project) {
        let scope = match role.project_id {
            Some(id) => format!("project:{id}"),
            None => "global".to_string(),
        };
        println!(
            "{:<20}  {:<24}  {:<10}  {}",
            role.slug,
            role.name,
            scope,
            role.mask()
        );
    }
}

fn cmd_audit(
    config: &Config,
    limit: usize,
    denied: bool,
    actor: Option<&str>,
    summary: bool,
) -> Result<()> {
    let store = open_store(config)?;

    if summary {
        let summaries = store.summarize()?;
        if summaries.is_empty() {
            println!("No checks recorded.");
            return Ok(());
        }
        println!("{:<20}  {:<8}  {:<8}  LAST SEEN", "ACTOR", "CHECKS", "DENIED");
        println!("{}", "-".repeat(60));
        for s in summaries {
            let last = Local
                .from_utc_datetime(&s.last_seen.naive_utc())
                .format("%Y-%m-%d %H:%M");
            println!("{:<20}  {:<8}  {:<8}  {last}", s.actor, s.checks, s.denied);
        }
        return Ok(());
    }

    let events: Vec<AuditEvent> = match actor {
        Some(actor) => store.for_actor(actor, limit, denied)?,
        None => store.recent(limit, denied)?,
    };

    if events.is_empty() {
        println!("No checks recorded.");
        return Ok(());
    }

    for event in events {
        print_event(&event);
    }

    Ok(())
}

fn print_decision(decision: &Decision) {
    match decision {
        Decision::Allow { tier } => println!("allow (tier: {tier})"),
        Decision::Deny { tier, missing } => println!("deny (tier: {tier}, missing: {missing})"),
    }
}

fn print_event(event: &AuditEvent) {
    let time = Local
        .from_utc_datetime(&event.timestamp.naive_utc())
        .format("%Y-%m-%d %H:%M:%S");

    let outcome = match event.outcome {
        Outcome::Allow { tier } => format!("ALLOW [{tier}]"),
        Outcome::Deny { tier, missing } => format!("DENY  [{tier}] missing {missing}"),
    };
    println!(
        "[{time}] {:<16} {:<24} {:<24} {outcome}",
        event.actor, event.scope, event.required
    );
}

fn exit_status(decision: &Decision) -> u8 {
    if decision.is_allowed() { 0 } else { EXIT_DENIED }
}

fn exit_code(decision: &Decision) -> ExitCode {
    ExitCode::from(exit_status(decision))
}

fn open_store(config: &Config) -> Result<AuditStore> {
    let db_path = config.audit_path();

    if !db_path.exists() {
        return Err(Error::AuditNotFound { path: db_path });
    }

    Ok(AuditStore::open(&db_path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use policy::Tier;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_args() {
        let cli = Cli::try_parse_from([
            "warden",
            "check",
            "--mask",
            "8",
            "--resource-mask",
            "run_tasks,manage_resources",
            "manage_users",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                admin,
                mask,
                resource_mask,
                capabilities,
            } => {
                assert!(!admin);
                assert_eq!(mask, Some(Permissions::MANAGE_USERS));
                assert_eq!(
                    resource_mask,
                    Some(Permissions::RUN_TASKS | Permissions::MANAGE_RESOURCES)
                );
                assert_eq!(capabilities, vec![Capability::ManageUsers]);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_unknown_capability_rejected() {
        assert!(Cli::try_parse_from(["warden", "check", "deploy"]).is_err());
    }

    #[test]
    fn test_check_uses_flags() {
        let allowed = cmd_check(
            false,
            Some(Permissions::MANAGE_USERS),
            None,
            &[Capability::ManageUsers],
        );
        assert!(allowed.is_allowed());

        let shadowed = cmd_check(
            false,
            Some(Permissions::MANAGE_USERS),
            Some(Permissions::MANAGE_RESOURCES),
            &[Capability::ManageUsers],
        );
        assert!(!shadowed.is_allowed());
        assert_eq!(shadowed.missing(), Permissions::MANAGE_USERS);

        let admin = cmd_check(true, None, Some(Permissions::NONE), &[Capability::ManageUsers]);
        assert!(admin.is_allowed());
    }

    const ROUTE_CONFIG: &str = r#"
[[roles]]
slug = "deployer"
name = "Deployer"
permissions = ["run_tasks", "manage_resources"]
project_id = 3

[[users]]
id = 1
username = "alice"

[[memberships]]
user_id = 1
project_id = 3
role = "deployer"

[[template_roles]]
project_id = 3
template_id = 9
role = "deployer"
permissions = ["run_tasks"]
"#;

    #[test]
    fn test_route_template_grant_denies() {
        let config = Config::parse(ROUTE_CONFIG).unwrap();
        let caps = [Capability::ManageResources];

        let decision = route_decision(&config, 1, "/project/3/templates/9", &caps).unwrap();
        assert_eq!(
            decision,
            Decision::Deny {
                tier: Tier::Resource,
                missing: Permissions::MANAGE_RESOURCES,
            }
        );
        assert_eq!(exit_status(&decision), EXIT_DENIED);

        let decision = route_decision(&config, 1, "/project/3/templates", &caps).unwrap();
        assert_eq!(decision, Decision::Allow { tier: Tier::Actor });
        assert_eq!(exit_status(&decision), 0);
    }

    #[test]
    fn test_route_errors() {
        let config = Config::parse(ROUTE_CONFIG).unwrap();
        let caps = [Capability::RunTasks];
        assert!(matches!(
            route_decision(&config, 7, "/project/3", &caps),
            Err(Error::UnknownUser { id: 7 })
        ));
        assert!(matches!(
            route_decision(&config, 1, "/project/3", &[]),
            Err(Error::Console(console::Error::EmptyRequirement))
        ));
    }
}
