pub mod delete_service;
pub mod dependency_checker;
pub mod repository;
