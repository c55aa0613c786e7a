pub const LATEST: &str = env!("CARGO_PKG_VERSION");
