pub mod error;
pub use error::{ErrorKind, FieldError, Resource, ServiceError};

pub mod password;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthService, SessionCredential};
pub use auth_service_impl::SeaOrmAuthService;

pub mod ticket_service;
pub mod ticket_service_impl;
pub use ticket_service::TicketService;
pub use ticket_service_impl::SeaOrmTicketService;

pub mod comment_service;
pub mod comment_service_impl;
pub use comment_service::CommentService;
pub use comment_service_impl::SeaOrmCommentService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::UserService;
pub use user_service_impl::SeaOrmUserService;
