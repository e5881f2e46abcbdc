//! User management handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use mockable::Clock;

use super::{
    ApiError,
    dto::{CreateUserBody, UpdateUserBody, UserSearchQuery},
};
use crate::user::{
    domain::{User, UserFilters, UserId, UserPage, UserPatch},
    ports::UserDirectory,
    services::UserManagementService,
};

type Service<U, C> = State<Arc<UserManagementService<U, C>>>;
type ApiResult<T> = Result<Json<T>, ApiError>;

/// `GET /users`
pub async fn list<U, C>(State(service): Service<U, C>) -> ApiResult<Vec<User>>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    Ok(Json(service.list_users().await?))
}

/// `POST /users`
pub async fn create<U, C>(
    State(service): Service<U, C>,
    payload: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Json(body) = payload?;
    let user = service.create_user(body.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/search?q=&role=&page=&page_size=`
pub async fn search<U, C>(
    State(service): Service<U, C>,
    params: Result<Query<UserSearchQuery>, QueryRejection>,
) -> ApiResult<UserPage>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Query(query) = params?;
    let filters = UserFilters::from(query);
    Ok(Json(service.search_users(&filters).await?))
}

/// `GET /users/{id}`
pub async fn show<U, C>(
    State(service): Service<U, C>,
    path: Result<Path<UserId>, PathRejection>,
) -> ApiResult<User>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    Ok(Json(service.get_user(id).await?))
}

/// `PUT /users/{id}`
pub async fn update<U, C>(
    State(service): Service<U, C>,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UpdateUserBody>, JsonRejection>,
) -> ApiResult<User>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    let Json(body) = payload?;
    let patch = UserPatch::from(body);
    Ok(Json(service.update_user(id, &patch).await?))
}

/// `DELETE /users/{id}`
pub async fn delete<U, C>(
    State(service): Service<U, C>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    let Path(id) = path?;
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
