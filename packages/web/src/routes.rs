//! HTTP routes. Handlers are generic over the storage backend so tests can run the
//! full router on `store::MemoryStore`.

use api::accounts;
use api::auth::SESSION_TOKEN_KEY;
use api::comments;
use api::{Backend, UserInfo};
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use store::{SessionToken, Trail};
use tower_sessions::Session;

use crate::error::AppError;
use crate::views;

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

pub fn router<S: Backend>(store: S) -> Router {
    Router::new()
        .route("/", get(home::<S>))
        .route("/register", get(register_form).post(register::<S>))
        .route("/login", get(login_form).post(login::<S>))
        .route("/logout", get(logout::<S>))
        .route("/Main", get(main_page::<S>))
        .route("/{trail}", get(trail_page::<S>).post(post_comment::<S>))
        .with_state(AppState { store })
}

async fn session_token(session: &Session) -> Result<Option<SessionToken>, AppError> {
    Ok(session.get::<SessionToken>(SESSION_TOKEN_KEY).await?)
}

async fn current_user<S: Backend>(store: &S, session: &Session) -> Result<Option<UserInfo>, AppError> {
    let Some(token) = session_token(session).await? else {
        return Ok(None);
    };
    let user = accounts::current_user(store, &token).await?;
    Ok(user.as_ref().map(UserInfo::from))
}

async fn home<S: Backend>(
    State(app): State<AppState<S>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let user = current_user(&app.store, &session).await?;
    Ok(Html(views::home_page(user.as_ref())))
}

async fn register_form() -> Html<String> {
    Html(views::register_page())
}

async fn register<S: Backend>(
    State(app): State<AppState<S>>,
    Form(form): Form<Credentials>,
) -> Result<Redirect, AppError> {
    accounts::register(&app.store, &form.email, &form.password).await?;
    Ok(Redirect::to("/login"))
}

async fn login_form() -> Html<String> {
    Html(views::login_page())
}

async fn login<S: Backend>(
    State(app): State<AppState<S>>,
    session: Session,
    Form(form): Form<Credentials>,
) -> Result<Redirect, AppError> {
    let (_, token) = accounts::login(&app.store, &form.email, &form.password).await?;

    if let Err(err) = replace_session_token(&app.store, &session, &token).await {
        // The browser never received the new token
        if let Err(cleanup) = accounts::end_session(&app.store, &token).await {
            tracing::error!("cannot end unused session: {}", cleanup);
        }
        return Err(err);
    }

    Ok(Redirect::to("/Main"))
}

/// Store `token` in the cookie session, ending any token it already held.
async fn replace_session_token<S: Backend>(
    store: &S,
    session: &Session,
    token: &SessionToken,
) -> Result<(), AppError> {
    if let Some(previous) = session_token(session).await? {
        accounts::end_session(store, &previous).await?;
    }
    session.cycle_id().await?;
    session.insert(SESSION_TOKEN_KEY, token).await?;
    Ok(())
}

async fn logout<S: Backend>(
    State(app): State<AppState<S>>,
    session: Session,
) -> Result<Redirect, AppError> {
    let Some(token) = session_token(&session).await? else {
        return Ok(Redirect::to("/login"));
    };
    accounts::end_session(&app.store, &token).await?;
    session.flush().await?;
    Ok(Redirect::to("/"))
}

async fn main_page<S: Backend>(
    State(app): State<AppState<S>>,
    session: Session,
) -> Result<Response, AppError> {
    match current_user(&app.store, &session).await? {
        Some(user) => Ok(Html(views::main_page(&user)).into_response()),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

async fn trail_page<S: Backend>(
    State(app): State<AppState<S>>,
    Path(name): Path<String>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let trail: Trail = name.parse()?;
    let comments = comments::comments_on(&app.store, trail).await?;
    let user = current_user(&app.store, &session).await?;
    Ok(Html(views::trail_page(trail, &comments, user.as_ref())))
}

async fn post_comment<S: Backend>(
    State(app): State<AppState<S>>,
    Path(name): Path<String>,
    session: Session,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    let token = session_token(&session).await?;
    let page = format!("/{name}");

    comments::add_comment(&app.store, token.as_ref(), &name, &form.content)
        .await
        .map_err(|err| match err {
            store::Error::EmptyContent => AppError::on_page(err, page.as_str()),
            err => err.into(),
        })?;

    Ok(Redirect::to(&page))
}
