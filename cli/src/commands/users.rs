//! `users` subcommands.

use anyhow::{Context as _, Result};
use roster_business::{
    ActivateUserCommand, DeactivateUserCommand, FetchAdminCollectionCommand,
    FetchCollectionCommand, FetchUserCommand, SetUserRoleCommand, SortOrder, User, UsersState,
};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{ListArgs, UsersCommand};
use crate::context::CliContext;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Tech")]
    tech: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            active: if user.active { "yes" } else { "no" }.to_owned(),
            tech: user.tech.join(", "),
        }
    }
}

fn users_table(users: &[User]) -> String {
    Table::new(users.iter().map(UserRow::from))
        .with(Style::rounded())
        .to_string()
}

pub async fn run_users(cli: &mut CliContext, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List(args) => run_list(cli, args).await,
        UsersCommand::Admin => run_admin(cli).await,
        UsersCommand::Show { id } => run_show(cli, &id).await,
        UsersCommand::Role { id, role } => {
            cli.run(SetUserRoleCommand::new(&id, role))
                .await
                .with_context(|| format!("Could not change the role of {id}"))?;
            Ok(())
        }
        UsersCommand::Activate { id } => {
            cli.run(ActivateUserCommand::new(&id))
                .await
                .with_context(|| format!("Could not activate {id}"))?;
            Ok(())
        }
        UsersCommand::Deactivate { id } => {
            cli.run(DeactivateUserCommand::new(&id))
                .await
                .with_context(|| format!("Could not deactivate {id}"))?;
            Ok(())
        }
    }
}

/// Fetch the collection and narrow the view to the requested page.
pub(crate) async fn load_page(cli: &mut CliContext, args: &ListArgs) -> Result<()> {
    cli.ctx
        .state_mut::<UsersState>()
        .set_showing_inactive(args.inactive);
    cli.run(FetchCollectionCommand)
        .await
        .context("Could not load users")?;

    let state = cli.ctx.state_mut::<UsersState>();
    state.set_filter(args.filter.as_deref().unwrap_or_default());
    state.set_order(if args.desc {
        SortOrder::Desc
    } else {
        SortOrder::Asc
    });
    state.set_per_page(args.per_page);
    state.set_page(args.page.saturating_sub(1));
    Ok(())
}

#[instrument(skip_all, name = "users_list", fields(page = args.page, inactive = args.inactive))]
async fn run_list(cli: &mut CliContext, args: ListArgs) -> Result<()> {
    load_page(cli, &args).await?;

    let state = cli.ctx.state::<UsersState>();
    if state.filtered_items().is_empty() {
        cli.out.dim("No users found.");
        return Ok(());
    }

    cli.out.print(users_table(state.page_items()));
    cli.out.dim(format!(
        "Page {}/{} · {} of {} users",
        state.pagination().page + 1,
        state.page_count(),
        state.filtered_items().len(),
        state.items().len()
    ));
    Ok(())
}

#[instrument(skip_all, name = "users_admin")]
async fn run_admin(cli: &mut CliContext) -> Result<()> {
    let stats = cli
        .run(FetchAdminCollectionCommand)
        .await
        .context("Could not load admin statistics")?;

    if stats.is_array() {
        cli.out
            .print(users_table(cli.ctx.state::<UsersState>().items()));
    } else {
        cli.out.print(format!("{stats:#}"));
    }
    Ok(())
}

#[instrument(skip_all, name = "users_show", fields(id = %id))]
async fn run_show(cli: &mut CliContext, id: &str) -> Result<()> {
    let user = cli
        .run(FetchUserCommand::new(id))
        .await
        .with_context(|| format!("Could not load user {id}"))?;

    cli.out.header(&user.name);
    cli.out.labeled("ID", user.id);
    cli.out.labeled("Email", &user.email);
    cli.out.labeled("Role", user.role);
    cli.out
        .labeled("Active", if user.active { "yes" } else { "no" });
    if !user.tech.is_empty() {
        cli.out.labeled("Tech", user.tech.join(", "));
    }
    Ok(())
}
