pub mod static_check;
