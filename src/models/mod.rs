pub mod expense;
pub mod maintenance;
pub mod refuel;
pub mod response;
pub mod route;
pub mod user;
pub mod vehicle;
