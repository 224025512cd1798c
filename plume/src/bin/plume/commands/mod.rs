pub mod comment;
pub mod favourite;
pub mod post;
pub mod search;
pub mod user;

use clap::Args;
use plume::{Caller, Role};

/// Identity the command acts as.
#[derive(Args, Debug, Clone)]
pub struct CallerArgs {
    /// User id performing the operation
    #[arg(long = "as", value_name = "USER_ID")]
    pub user_id: String,

    /// Role of the acting user
    #[arg(long, default_value = "user")]
    pub role: Role,
}

impl CallerArgs {
    pub fn caller(&self) -> Caller {
        Caller::new(self.user_id.clone(), self.role)
    }
}
