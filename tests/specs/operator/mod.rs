//! Operator API specs

mod campaign;
mod status;
mod targets;
