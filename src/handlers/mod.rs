pub mod pages;
pub mod todos;
