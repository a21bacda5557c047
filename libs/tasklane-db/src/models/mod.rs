pub mod activity;
pub mod todo;

pub use activity::{Activity, NewActivity};
pub use todo::{NewTodo, Todo, DEFAULT_PRIORITY};
