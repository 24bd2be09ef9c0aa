pub static VERSION_STRING: &str = include_str!(concat!(env!("OUT_DIR"), "/version"));
