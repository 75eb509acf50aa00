pub mod action_executor;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod discovery;
pub mod execution_service;
pub mod icons;
pub mod index_store;
pub mod input_validation;
pub mod logging;
pub mod model;
pub mod notification;
pub mod runtime;
pub mod search;
pub mod settings;
pub mod startup;
pub mod transport;
pub mod validator;
