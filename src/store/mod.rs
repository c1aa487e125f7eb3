pub mod import;
pub mod playlist;
pub mod todo;

#[cfg(test)]
pub(crate) mod testing;
