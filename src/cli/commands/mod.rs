//! One module per subcommand.

pub mod add;
pub mod audit_cmd;
pub mod delete;
pub mod list;
pub mod login;
pub mod logout;
pub mod register;
pub mod show;
pub mod update;
pub mod whoami;
