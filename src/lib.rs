//! runtab
//!
//! Groups a flat JSON array of experiment-run records into fixed-size
//! trials and prints selected fields as an aligned text table or CSV.
//!
//! Data flow: [`source`] loads the records, [`table`] slices them and
//! resolves cells, [`config`] and [`report`] decide which columns, defaults,
//! order and output format apply.

pub mod config;
pub mod logging;
pub mod model;
pub mod report;
pub mod source;
pub mod table;
