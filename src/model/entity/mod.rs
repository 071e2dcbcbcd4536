mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreateUpdate, CourseLevel, CourseStatus};
pub(crate) use course::nullable_field;

mod module;
pub use module::{Module, ModuleCreate, ModuleUpdate, ModuleWithLessonsRow};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonUpdate, LessonWithContentRow};

mod content;
pub use content::Content;
