pub mod clock;
pub mod middleware;
pub mod password;
pub mod tokens;
