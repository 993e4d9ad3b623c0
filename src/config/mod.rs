pub mod drive_config;
