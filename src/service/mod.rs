//! Application services on top of the stores and the resolver.

mod region_service;
mod user_service;

pub use region_service::RegionService;
pub use user_service::{NewUser, UserService, UserUpdate};
