use clap::{Parser, Subcommand};
use coursiva::model::entity::{
    Course, CourseCreateUpdate, Lesson, LessonCreate, Module, ModuleCreate, UserEntity,
    UserEntityCreateUpdate,
};
use coursiva::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use coursiva::web::AuthenticatedUser;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for seeding the course marketplace DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Username of the owning instructor
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        price_cents: i64,
    },
}

/// Module management
#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Slug of the course to attach the module to
        #[arg(long)]
        course_slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Module title to attach the lesson to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Path to a JSON file with the lesson content document
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        order_index: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> coursiva::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL not set"))?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { username, password } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        username,
                        password_hash: coursiva::auth::hash_password(&password)
                            .expect("unable to hash password"),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                instructor,
                title,
                description,
                price_cents,
            } => {
                let user = UserEntity::find_by_username(&mm, &actor, &instructor)
                    .await?
                    .expect("instructor not found");
                let owner = AuthenticatedUser::new(user.id(), user.role());

                let course = Course::create(
                    &mm,
                    &owner,
                    CourseCreateUpdate {
                        title,
                        description,
                        status: None,
                        price_cents: Some(price_cents),
                        level: None,
                        category: None,
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_slug,
                title,
                description,
                order_index,
            } => {
                let course = Course::find_by_slug(&mm, &actor, &course_slug)
                    .await?
                    .expect("course not found");

                let module = Module::create(
                    &mm,
                    ModuleCreate {
                        course_id: course.id(),
                        title,
                        description,
                        order_index,
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                module_title,
                title,
                description,
                file,
                order_index,
            } => {
                let module_id: uuid::Uuid =
                    sqlx::query_scalar("SELECT id FROM modules WHERE title = $1")
                        .bind(&module_title)
                        .fetch_one(mm.executor())
                        .await
                        .map_err(DatabaseError::SqlxError)?;

                let content = match file {
                    Some(path) => {
                        let raw = std::fs::read_to_string(path)?;
                        Some(serde_json::from_str(&raw).map_err(DatabaseError::SerdeError)?)
                    }
                    None => None,
                };

                let lesson = Lesson::create_with_content(
                    &mm,
                    LessonCreate {
                        module_id,
                        title,
                        description,
                        order_index,
                        content,
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },
    }

    Ok(())
}
