//! A memory-efficient, append-only storage engine for large time-ordered
//! histories of GPS observations.
//!
//! Records come in three flavors — [`record::Point`], [`record::Measurement`], and
//! [`record::Stay`] — each packed into a small fixed-width binary layout and held in
//! a columnar [`buffer::ColumnBuffer`]. A [`collection::Collection`] wraps that
//! buffer with an (optional) monotonic-time invariant; an [`index_view::IndexView`]
//! gives you a read-only, reorderable projection over one without copying any
//! record data. [`persistence`] handles framing collections to and from a
//! self-describing binary container; [`search`] and [`query`] answer the common
//! questions asked of a time-ordered GPS history.
//!
//! # Appending observations
//!
//! ```
//! use gps_history::collection::Collection;
//! use gps_history::record::Point;
//!
//! let mut points: Collection<Point> = Collection::new();
//! points.push(Point { time: 1_700_000_000, latitude: 45.5, longitude: -122.6, altitude: Some(30.0) }).unwrap();
//! points.push(Point { time: 1_700_000_060, latitude: 45.51, longitude: -122.61, altitude: Some(31.0) }).unwrap();
//! assert_eq!(2, points.len());
//! assert!(points.sorted_by_time());
//! ```
//!
//! # Finding a location by time
//!
//! ```
//! use gps_history::collection::Collection;
//! use gps_history::record::Point;
//! use gps_history::query;
//!
//! let mut points: Collection<Point> = Collection::new();
//! points.push(Point { time: 100, latitude: 1.0, longitude: 1.0, altitude: None }).unwrap();
//! points.push(Point { time: 200, latitude: 2.0, longitude: 2.0, altitude: None }).unwrap();
//! let located = query::location_by_time(&points, 150, Some(60)).unwrap();
//! assert_eq!(Some(0), located);
//! ```

#![deny(missing_docs, trivial_casts, trivial_numeric_casts, unsafe_code, unused_import_braces, unused_qualifications)]

pub mod buffer;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod index_view;
pub mod persistence;
pub mod query;
pub mod record;
pub mod search;

pub use collection::{Collection, Enforcement};
pub use error::{Error, Result};
pub use index_view::IndexView;
pub use record::{Measurement, Point, Stay};
