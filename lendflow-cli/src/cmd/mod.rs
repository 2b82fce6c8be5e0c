pub mod config;
pub mod deployed;
pub mod migrate;
pub mod report;
pub mod run;
pub mod runs;
pub mod save;
pub mod trace;
pub mod validate;
