use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roster_business::Role;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Manage roster users from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend origin, e.g. https://roster.example.com
    #[arg(long, global = true, env = "ROSTER_API_URL")]
    pub api_url: Option<String>,

    /// Config file to read the session from
    #[arg(long, global = true, env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and save the session token
    Login(CredentialArgs),
    /// Create an account and sign in
    Register(CredentialArgs),
    /// Forget the saved session
    Logout,
    /// Show the profile of the saved session
    Whoami,
    /// Browse and manage users
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Args)]
pub struct CredentialArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, env = "ROSTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users, one page at a time
    List(ListArgs),
    /// Show the admin statistics payload
    Admin,
    /// Show one user
    Show {
        /// User ID
        id: String,
    },
    /// Assign a role
    Role {
        /// User ID
        id: String,
        /// `user`, `admin`, or any other role the backend knows
        role: Role,
    },
    /// Re-activate a user
    Activate {
        /// User ID
        id: String,
    },
    /// Deactivate a user
    Deactivate {
        /// User ID
        id: String,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// List deactivated users instead of active ones
    #[arg(long)]
    pub inactive: bool,

    /// Only users whose name or tech tags contain this text
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Sort by name, Z to A
    #[arg(long)]
    pub desc: bool,

    /// Page to show, starting at 1
    #[arg(long, short = 'p', default_value = "1")]
    pub page: usize,

    /// Users per page
    #[arg(long, short = 'l', default_value = "20")]
    pub per_page: usize,
}
