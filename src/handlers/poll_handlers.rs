use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::auth::csrf;
use crate::config::PollSettings;
use crate::errors::{AppError, render};
use crate::models::poll::{Question, VoteForm};
use crate::models::store::PollStore;
use crate::polls::{self, Viewer, VoteOutcome};
use crate::templates_structs::{DetailTemplate, IndexTemplate, PageContext, ResultsTemplate};

/// GET /polls/
/// Latest visible questions, newest first.
pub async fn index(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer::from_session(&session);
    let mut latest_question_list = polls::load_visible(store.get_ref(), Utc::now(), viewer).await?;
    latest_question_list.truncate(settings.index_limit);

    let ctx = PageContext::build(&session, &settings);
    render(IndexTemplate { ctx, latest_question_list })
}

/// GET /polls/{id}/ and GET /polls/{id}/vote/
/// Question text with the vote form; 404 unless visible to this viewer.
pub async fn detail(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let question = resolve_for(&store, &session, path.into_inner()).await?;
    let ctx = PageContext::build(&session, &settings);
    render(DetailTemplate { ctx, question, error_message: None })
}

/// POST /polls/{id}/vote/
/// Records a vote and redirects to the results, or redisplays the form with an error.
pub async fn vote(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<VoteForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let question = resolve_for(&store, &session, path.into_inner()).await?;

    match polls::cast_vote(store.get_ref(), question, form.choice_id()).await? {
        VoteOutcome::Recorded(question) => Ok(HttpResponse::Found()
            .insert_header(("Location", format!("/polls/{}/results/", question.id)))
            .finish()),
        VoteOutcome::Rejected { question, message } => {
            let ctx = PageContext::build(&session, &settings);
            render(DetailTemplate {
                ctx,
                question,
                error_message: Some(message.to_string()),
            })
        }
    }
}

/// GET /polls/{id}/results/
pub async fn results(
    store: web::Data<dyn PollStore>,
    settings: web::Data<PollSettings>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let question = resolve_for(&store, &session, path.into_inner()).await?;
    let ctx = PageContext::build(&session, &settings);
    render(ResultsTemplate { ctx, question })
}

async fn resolve_for(
    store: &web::Data<dyn PollStore>,
    session: &Session,
    id: i64,
) -> Result<Question, AppError> {
    polls::resolve(store.get_ref(), id, Utc::now(), Viewer::from_session(session)).await
}
