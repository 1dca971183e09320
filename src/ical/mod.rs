//! This module exports calendar events as iCal files

mod builder;
pub use builder::build_from;

use crate::config::{self, ORG_NAME, PRODUCT_NAME};

pub fn default_prod_id() -> String {
    format!("-//{}//{}//EN", config::read(&ORG_NAME), config::read(&PRODUCT_NAME))
}
