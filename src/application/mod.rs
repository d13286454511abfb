// Application layer - Use cases composed from the domain
pub mod device_service;
pub mod power_panel;
pub mod sample_repository;
pub mod summary;
