pub mod consts;
pub mod gateway;
pub mod handlers;
pub mod model;
pub mod options;
pub mod resolver;
