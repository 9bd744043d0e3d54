pub mod hooks;
pub mod pool;
pub mod status;
pub mod version;
