//! Users, microposts, who follows whom, and the feed that falls out of it.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate guard;
#[macro_use]
extern crate diesel;

pub mod accounts;
pub mod config;
pub mod credentials;
pub mod datastore;
pub mod feed;
pub mod graph;
pub mod metrics;
pub mod microposts;
pub mod seed;
pub mod twoface;
pub mod validation;
