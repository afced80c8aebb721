pub mod db_init;
pub mod record_repository;
