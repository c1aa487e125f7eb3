pub mod hash;
pub mod todo;
pub mod track;
