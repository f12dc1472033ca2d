pub mod file;
pub mod user;

#[cfg(test)]
pub(crate) mod memory;
