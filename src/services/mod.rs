pub mod auth;
pub mod categories;
pub mod seeder;
pub mod todos;
