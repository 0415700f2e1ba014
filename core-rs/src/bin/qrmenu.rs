//! qrmenu - QR Menu maintenance CLI
//!
//! Command-line interface for the role administration flows: the
//! one-off maintenance surface that mutates role data directly against
//! the hosted service.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use qrmenu_core::{initialize_user_roles, GateConfig, HostedRoleStore, Role, RoleStore, UserId};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "qrmenu")]
#[command(version = "0.4.2")]
#[command(about = "QR Menu access-control maintenance CLI", long_about = None)]
struct Cli {
    /// Path to gate.yaml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hosted service row-API root (overrides config)
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Service key for the hosted service (overrides config)
    #[arg(long, global = true)]
    service_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage role assignments (list, assign, remove, init, check)
    Role {
        #[command(subcommand)]
        command: RoleCommands,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List all role grants for a user
    List {
        /// User identity
        #[arg(long)]
        user: String,
    },
    /// Grant a role to a user
    Assign {
        /// User identity
        #[arg(long)]
        user: String,
        /// Role label (admin | user)
        #[arg(long)]
        role: String,
    },
    /// Remove every grant of a role from a user
    Remove {
        /// User identity
        #[arg(long)]
        user: String,
        /// Role label (admin | user)
        #[arg(long)]
        role: String,
    },
    /// Assign the default role if the user has none
    Init {
        /// User identity
        #[arg(long)]
        user: String,
    },
    /// Check whether a user holds a role
    Check {
        /// User identity
        #[arg(long)]
        user: String,
        /// Role label (admin | user)
        #[arg(long)]
        role: String,
    },
}

/// Resolve the hosted store from flags, falling back to the config file.
fn resolve_store(cli: &Cli) -> anyhow::Result<HostedRoleStore> {
    if let (Some(url), Some(key)) = (&cli.service_url, &cli.service_key) {
        return Ok(HostedRoleStore::new(url.clone(), key.clone()));
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("gate.yaml"));
    let config = GateConfig::from_file(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let service = config.service.ok_or_else(|| {
        anyhow!(
            "no service section in {} and no --service-url/--service-key given",
            config_path.display()
        )
    })?;

    Ok(
        HostedRoleStore::new(service.base_url, service.service_key)
            .with_table(service.roles_table),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = resolve_store(&cli)?;

    match cli.command {
        Commands::Role { command } => match command {
            RoleCommands::List { user } => {
                let user_id = UserId::new(user);
                let assignments = store.roles_for_user(&user_id).await?;

                if assignments.is_empty() {
                    println!("No role grants for user {}", user_id);
                } else {
                    println!("Role grants for user {}:", user_id);
                    for a in &assignments {
                        println!("  {}  {}  (granted {})", a.id, a.role, a.created_at);
                    }
                }
            }

            RoleCommands::Assign { user, role } => {
                let user_id = UserId::new(user);
                let role = Role::from_str(&role)?;

                let assignment = store.assign_role(&user_id, role).await?;
                tracing::debug!(id = %assignment.id, "role grant created");

                println!("\n✓ Role assigned");
                println!("  User: {}", user_id);
                println!("  Role: {}", role);
                println!("  Grant id: {}", assignment.id);
            }

            RoleCommands::Remove { user, role } => {
                let user_id = UserId::new(user);
                let role = Role::from_str(&role)?;

                store.remove_role(&user_id, role).await?;

                println!("\n✓ Role removed");
                println!("  User: {}", user_id);
                println!("  Role: {}", role);
            }

            RoleCommands::Init { user } => {
                let user_id = UserId::new(user);
                let assigned = initialize_user_roles(&store, &user_id).await?;

                if assigned {
                    println!("\n✓ Default role assigned to {}", user_id);
                } else {
                    println!("User {} already has roles, nothing to do", user_id);
                }
            }

            RoleCommands::Check { user, role } => {
                let user_id = UserId::new(user);
                let role = Role::from_str(&role)?;

                let assignments = store.roles_for_user(&user_id).await?;
                let has_role = assignments.iter().any(|a| a.role == role);

                if has_role {
                    println!("✓ User {} has role {}", user_id, role);
                } else {
                    println!("✗ User {} does not have role {}", user_id, role);
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}
