//! Force-directed particle layout for a compile cluster.
//!
//! Every host reported by the monitor becomes a circular [`pool::Node`]. Hosts
//! that share compile jobs drift toward each other, overlapping circles push
//! apart, and the canvas edges reflect anything that tries to leave.
//!
//! ```no_run
//! use eframe::egui::vec2;
//! use poolview::config::PoolConfig;
//! use poolview::monitor::{HostDirectory, dispatch, parse_feed};
//! use poolview::pool::PoolLayout;
//!
//! let mut hosts = HostDirectory::new();
//! let mut layout = PoolLayout::new(PoolConfig::default(), 7).unwrap();
//! layout.set_canvas(vec2(800.0, 600.0));
//!
//! let feed = std::fs::read_to_string("feed.jsonl").unwrap();
//! for event in parse_feed(&feed).unwrap() {
//!     dispatch(&event, &mut hosts, &mut layout);
//! }
//! layout.tick();
//! let _snapshot = layout.snapshot();
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod pool;
pub mod util;

pub use error::{Error, Result};
