pub mod assignment;
pub mod comment;
pub mod label;
pub mod session;
pub mod ticket;
pub mod user;

pub use assignment::AssignmentRepository;
pub use comment::CommentRepository;
pub use label::LabelRepository;
pub use session::SessionRepository;
pub use ticket::TicketRepository;
pub use user::{NewUserRecord, UserChanges, UserRepository};
