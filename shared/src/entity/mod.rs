pub mod import_logs;
