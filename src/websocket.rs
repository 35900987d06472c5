pub mod dispatcher;
pub mod handlers;
pub mod presence;
