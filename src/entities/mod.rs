pub mod prelude;

pub mod assignments;
pub mod comments;
pub mod labels;
pub mod sessions;
pub mod ticket_labels;
pub mod tickets;
pub mod users;
