pub mod event;
pub mod face;
pub mod person;
pub mod validation;
