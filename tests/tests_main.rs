#[path = "helpers/mod.rs"]
mod helpers;

#[path = "import/mod.rs"]
mod import;

#[cfg(feature = "interchange")]
#[path = "interchange/mod.rs"]
mod interchange;
