pub mod field_registry;
pub mod orchestrator;
pub mod progress;
pub mod validation;
