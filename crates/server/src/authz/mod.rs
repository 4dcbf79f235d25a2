pub mod guard;
pub mod resolver;

pub use guard::{authorize, authorize_note, Authorized, RoleSet};
