pub mod filesystem;
pub mod sensor;
