//! CLI entry point for entra-ops — Microsoft Graph user, group and risk operations.
//!
//! Authenticates with the OAuth2 client-credentials grant, then runs one
//! subcommand against Graph.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (auth failure, API error, network error)
//! - 2: argument validation error (clap handles this automatically)

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use entra_ops::auth::ClientCredentialsProvider;
use entra_ops::client::GraphClient;
use entra_ops::users::AuthMethodKind;
use entra_ops::{groups, identity_protection, users};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Azure AD tenant ID.
    #[arg(long, env = "GRAPH_TENANT_ID")]
    tenant_id: String,

    /// Application (client) ID of the app registration.
    #[arg(long, env = "GRAPH_CLIENT_ID")]
    client_id: String,

    /// Client secret of the app registration. Prefer GRAPH_CLIENT_SECRET
    /// to keep it out of process listings and shell history.
    #[arg(long, env = "GRAPH_CLIENT_SECRET", hide_env_values = true)]
    secret: String,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the user object.
    GetUser { user: String },
    /// List the display names of groups the user belongs to.
    Groups { user: String },
    /// Block sign-in for the account.
    Disable { user: String },
    /// Allow sign-in for the account.
    Enable { user: String },
    /// Revoke all sign-in sessions for the user.
    RevokeSessions { user: String },
    /// Print all registered authentication methods.
    AuthMethods { user: String },
    /// Print Microsoft Authenticator registrations.
    AuthenticatorApps { user: String },
    /// Remove one authentication method.
    RemoveMethod {
        user: String,
        #[arg(value_enum)]
        kind: MethodKind,
        method_id: String,
    },
    /// List the display names of a group's members.
    GroupMembers { group_id: String },
    /// List high/medium risk users.
    RiskyUsers,
    /// Dismiss the risk for a user (UPN or object ID).
    DismissRisk { user: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodKind {
    Authenticator,
    Phone,
    Fido2,
    Email,
    SoftwareOath,
    Tap,
}

impl From<MethodKind> for AuthMethodKind {
    fn from(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Authenticator => AuthMethodKind::MicrosoftAuthenticator,
            MethodKind::Phone => AuthMethodKind::Phone,
            MethodKind::Fido2 => AuthMethodKind::Fido2,
            MethodKind::Email => AuthMethodKind::Email,
            MethodKind::SoftwareOath => AuthMethodKind::SoftwareOath,
            MethodKind::Tap => AuthMethodKind::TemporaryAccessPass,
        }
    }
}

/// What a subcommand produced, for printing.
enum Output {
    Json(serde_json::Value),
    Names(Vec<String>),
    Done(String),
}

async fn run(cli: Cli) -> entra_ops::error::Result<Output> {
    let client = GraphClient::new()?;
    let provider = ClientCredentialsProvider::new()?;
    client
        .authenticate(&provider, &cli.tenant_id, &cli.client_id, &cli.secret)
        .await?;

    let output = match cli.command {
        Action::GetUser { user } => Output::Json(users::get_user(&client, &user).await?),
        Action::Groups { user } => Output::Names(users::get_user_groups(&client, &user).await?),
        Action::Disable { user } => {
            users::disable_account(&client, &user).await?;
            Output::Done(format!("Disabled account {user}"))
        }
        Action::Enable { user } => {
            users::enable_account(&client, &user).await?;
            Output::Done(format!("Enabled account {user}"))
        }
        Action::RevokeSessions { user } => {
            users::revoke_sign_in_sessions(&client, &user).await?;
            Output::Done(format!("Revoked sign-in sessions for {user}"))
        }
        Action::AuthMethods { user } => {
            Output::Json(users::list_auth_methods(&client, &user).await?)
        }
        Action::AuthenticatorApps { user } => {
            Output::Json(users::list_authenticator_app_methods(&client, &user).await?)
        }
        Action::RemoveMethod {
            user,
            kind,
            method_id,
        } => {
            let kind = AuthMethodKind::from(kind);
            users::remove_auth_method(&client, &user, kind, &method_id).await?;
            Output::Done(format!(
                "Removed {} {method_id} from {user}",
                kind.path_segment()
            ))
        }
        Action::GroupMembers { group_id } => {
            Output::Names(groups::get_group_users(&client, &group_id).await?)
        }
        Action::RiskyUsers => {
            let risky = identity_protection::get_risky_users(&client).await?;
            Output::Json(serde_json::to_value(risky)?)
        }
        Action::DismissRisk { user } => {
            identity_protection::dismiss_user_risk(&client, &user).await?;
            Output::Done(format!("Dismissed risk for {user}"))
        }
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(Output::Json(value)) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        Ok(Output::Names(names)) => {
            for name in names {
                println!("{name}");
            }
        }
        Ok(Output::Done(message)) => println!("{message}"),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
