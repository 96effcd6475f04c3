mod commands;
mod filter;
mod state;

pub use commands::{
    ActivateUserCommand, DeactivateUserCommand, FetchAdminCollectionCommand,
    FetchCollectionCommand, FetchUserCommand, SetUserRoleCommand,
};
pub use filter::{SortOrder, filtered_collection};
pub use state::{DEFAULT_PER_PAGE, Pagination, UsersState};
