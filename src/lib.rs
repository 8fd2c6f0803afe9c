pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod flatfile;
pub mod merge;
pub mod output;
pub mod pairs;
pub mod reconcile;
pub mod table;
pub mod uniprot;
