//! Managed resource types and the remote operations every one of them
//! supports.

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{CourseId, EventId, NewsId, OrderId, UserId},
    protocol::{
        CourseInfo, CourseListItem, CreateCourseRequest, CreateEventRequest, CreateNewsRequest,
        CreateUserRequest, EventInfo, EventListItem, NewsInfo, NewsListItem, NoCreate,
        OrderListItem, PageRequest, PageResult, UpdateCourseRequest, UpdateEventRequest,
        UpdateNewsRequest, UpdateOrderRequest, UpdateUserRequest, UserInfo, UserListItem,
    },
};
use validator::Validate;

use crate::error::ClientError;

/// Static description of one managed entity type: its wire types and the
/// API path it lives under.
pub trait Resource: Send + Sync + 'static {
    type Id: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync;
    type Item: Clone + fmt::Debug + DeserializeOwned + Send + Sync;
    type Detail: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;
    type Create: fmt::Debug + Serialize + Validate + Send + Sync;
    type Update: fmt::Debug + Serialize + Send + Sync;

    /// Collection path relative to the API base url.
    const PATH: &'static str;
    /// Lower-case singular name used in notices and logs.
    const LABEL: &'static str;
}

pub struct Users;
pub struct Events;
pub struct News;
pub struct Courses;
pub struct Orders;

impl Resource for Users {
    type Id = UserId;
    type Item = UserListItem;
    type Detail = UserInfo;
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    const PATH: &'static str = "users";
    const LABEL: &'static str = "user";
}

impl Resource for Events {
    type Id = EventId;
    type Item = EventListItem;
    type Detail = EventInfo;
    type Create = CreateEventRequest;
    type Update = UpdateEventRequest;

    const PATH: &'static str = "events";
    const LABEL: &'static str = "event";
}

impl Resource for News {
    type Id = NewsId;
    type Item = NewsListItem;
    type Detail = NewsInfo;
    type Create = CreateNewsRequest;
    type Update = UpdateNewsRequest;

    const PATH: &'static str = "news";
    const LABEL: &'static str = "news";
}

impl Resource for Courses {
    type Id = CourseId;
    type Item = CourseListItem;
    type Detail = CourseInfo;
    type Create = CreateCourseRequest;
    type Update = UpdateCourseRequest;

    const PATH: &'static str = "courses";
    const LABEL: &'static str = "course";
}

impl Resource for Orders {
    type Id = OrderId;
    type Item = OrderListItem;
    type Detail = OrderListItem;
    type Create = NoCreate;
    type Update = UpdateOrderRequest;

    const PATH: &'static str = "orders";
    const LABEL: &'static str = "order";
}

/// Remote operations for one resource type.
#[async_trait]
pub trait RemoteResource<R: Resource>: Send + Sync {
    async fn list(&self, request: PageRequest) -> Result<PageResult<R::Item>, ClientError>;
    async fn get(&self, id: &R::Id) -> Result<R::Detail, ClientError>;
    async fn create(&self, payload: &R::Create) -> Result<R::Detail, ClientError>;
    async fn update(&self, id: &R::Id, payload: &R::Update) -> Result<R::Detail, ClientError>;
    async fn delete(&self, id: &R::Id) -> Result<(), ClientError>;
}
