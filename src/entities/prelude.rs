pub use super::assignments::Entity as Assignments;
pub use super::comments::Entity as Comments;
pub use super::labels::Entity as Labels;
pub use super::sessions::Entity as Sessions;
pub use super::ticket_labels::Entity as TicketLabels;
pub use super::tickets::Entity as Tickets;
pub use super::users::Entity as Users;
