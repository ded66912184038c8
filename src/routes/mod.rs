pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Registers every route plus the extractor settings they rely on.
pub fn config(cfg: &mut web::ServiceConfig) {
    // Bodies that do not parse are reported like any other invalid input,
    // and a task id that is not an integer cannot name an existing task.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|_err, _req| AppError::task_not_found().into()),
    );

    cfg.service(health::root)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::token),
        )
        .service(
            web::scope("/api/{user_id}/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task)
                .service(tasks::toggle_task),
        );
}
