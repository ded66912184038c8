pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskInput, TaskPatch};
pub use user::User;
