pub mod example01_dirty_basics;
pub mod example02_typed_attributes;
pub mod example03_save_lifecycle;
