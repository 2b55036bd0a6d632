pub mod server_type;
