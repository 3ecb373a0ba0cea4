use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{get_username, require_superuser, set_flash};
use crate::auth::{csrf, password, validate};
use crate::config::PollSettings;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::poll::{ChoiceForm, QuestionForm, TEXT_MAX_LEN};
use crate::models::store::{PollStore, UserStore};
use crate::models::user::{NewUser, UserForm};
use crate::templates_structs::{AdminIndexTemplate, PageContext, QuestionAdminTemplate, UserFormTemplate};

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}

/// GET /admin
/// Every question regardless of publication time or choices.
pub async fn index(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;

    let mut questions = store.list_all_questions().await?;
    questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

    let ctx = PageContext::build(&session, &settings);
    render(AdminIndexTemplate {
        ctx,
        questions,
        errors: vec![],
        form_question_text: String::new(),
        form_pub_date: String::new(),
        form_choices: String::new(),
    })
}

/// POST /admin/questions
/// Creates a question and, optionally, its initial choices (one per line).
pub async fn create_question(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    form: web::Form<QuestionForm>,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors = Vec::new();
    if let Some(e) = validate::validate_required(&form.question_text, "Question text", TEXT_MAX_LEN) {
        errors.push(e);
    }
    let pub_date = match validate::parse_pub_date(&form.pub_date) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let choices: Vec<&str> = form
        .choices
        .lines()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    for choice in &choices {
        if let Some(e) = validate::validate_required(choice, "Choice text", TEXT_MAX_LEN) {
            errors.push(e);
        }
    }

    let Some(pub_date) = pub_date.filter(|_| errors.is_empty()) else {
        let mut questions = store.list_all_questions().await?;
        questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        let ctx = PageContext::build(&session, &settings);
        return render(AdminIndexTemplate {
            ctx,
            questions,
            errors,
            form_question_text: form.question_text.clone(),
            form_pub_date: form.pub_date.clone(),
            form_choices: form.choices.clone(),
        });
    };

    let question_id = store
        .create_question_with_choices(form.question_text.trim(), pub_date, &choices)
        .await?;

    log::info!(
        "{} created question {question_id} with {} choices",
        get_username(&session).unwrap_or_default(),
        choices.len()
    );
    set_flash(&session, "Question created");
    Ok(redirect(&format!("/admin/questions/{question_id}")))
}

/// GET /admin/questions/{id}
pub async fn question_detail(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;

    let question = store
        .find_question_by_id(path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, &settings);
    render(QuestionAdminTemplate { ctx, question, errors: vec![] })
}

/// POST /admin/questions/{id}/choices
pub async fn add_choice(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<ChoiceForm>,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let question_id = path.into_inner();
    if let Some(e) = validate::validate_required(&form.choice_text, "Choice text", TEXT_MAX_LEN) {
        let question = store
            .find_question_by_id(question_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let ctx = PageContext::build(&session, &settings);
        return render(QuestionAdminTemplate { ctx, question, errors: vec![e] });
    }

    let choice_id = store.add_choice(question_id, form.choice_text.trim()).await?;
    log::info!("Added choice {choice_id} to question {question_id}");

    set_flash(&session, "Choice added");
    Ok(redirect(&format!("/admin/questions/{question_id}")))
}

/// POST /admin/questions/{id}/delete
pub async fn delete_question(
    store: web::Data<dyn PollStore>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let question_id = path.into_inner();
    if !store.delete_question(question_id).await? {
        return Err(AppError::NotFound);
    }
    log::info!("Deleted question {question_id}");

    set_flash(&session, "Question deleted");
    Ok(redirect("/admin"))
}

/// GET /admin/users/new
pub async fn new_user_form(
    settings: web::Data<PollSettings>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;

    let ctx = PageContext::build(&session, &settings);
    render(UserFormTemplate {
        ctx,
        errors: vec![],
        form_username: String::new(),
        form_email: String::new(),
    })
}

/// POST /admin/users
pub async fn create_user(
    users: web::Data<dyn UserStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    require_superuser(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = [
        validate::validate_username(&form.username),
        validate::validate_email(&form.email),
        validate::validate_password(&form.password),
    ]
    .into_iter()
    .flatten()
    .collect();

    if errors.is_empty() {
        let new = NewUser {
            username: form.username.trim().to_string(),
            password: password::hash_password(&form.password)?,
            email: form.email.trim().to_string(),
            is_superuser: form.wants_superuser(),
        };
        match users.create_user(&new).await {
            Ok(id) => {
                log::info!("Created user {id} ('{}', superuser={})", new.username, new.is_superuser);
                set_flash(&session, &format!("User '{}' created", new.username));
                return Ok(redirect("/admin"));
            }
            Err(AppError::Conflict(msg)) => errors.push(msg),
            Err(e) => return Err(e),
        }
    }

    let ctx = PageContext::build(&session, &settings);
    render(UserFormTemplate {
        ctx,
        errors,
        form_username: form.username.clone(),
        form_email: form.email.clone(),
    })
}
