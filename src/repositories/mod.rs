pub mod expense_repository;
pub mod maintenance_repository;
pub mod refuel_repository;
pub mod route_repository;
pub mod user_repository;
pub mod vehicle_repository;
