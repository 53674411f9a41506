pub mod db;
pub mod setup;
