//! Scripted in-memory remote used by the controller tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use shared::{
    domain::UserId,
    protocol::{
        CreateUserRequest, PageRequest, PageResult, UpdateUserRequest, UserInfo, UserListItem,
    },
};
use tokio::sync::oneshot;

use crate::{error::ClientError, resource::RemoteResource, resource::Users};

type Scripted<T> = Result<T, (u16, Option<String>)>;

struct ListStep {
    gate: Option<oneshot::Receiver<()>>,
    result: Scripted<PageResult<UserListItem>>,
}

#[derive(Default)]
pub struct FakeUsers {
    list_script: Mutex<VecDeque<ListStep>>,
    record: Mutex<Option<UserInfo>>,
    update_response: Mutex<Option<UserInfo>>,
    fail_with: Mutex<Option<(u16, Option<String>)>>,
    list_calls: Mutex<Vec<PageRequest>>,
    calls: Mutex<Vec<String>>,
}

impl FakeUsers {
    pub fn with_record(record: UserInfo) -> Self {
        let fake = Self::default();
        *fake.record.lock().expect("lock") = Some(record);
        fake
    }

    pub fn script_list(&self, result: Scripted<PageResult<UserListItem>>) {
        self.list_script
            .lock()
            .expect("lock")
            .push_back(ListStep { gate: None, result });
    }

    /// Queues a list response that is held back until the returned sender
    /// fires.
    pub fn script_gated_list(
        &self,
        result: Scripted<PageResult<UserListItem>>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_script.lock().expect("lock").push_back(ListStep {
            gate: Some(rx),
            result,
        });
        tx
    }

    /// Makes get/create/update/delete fail with the given status.
    pub fn fail_mutations(&self, status: u16, message: Option<&str>) {
        *self.fail_with.lock().expect("lock") = Some((status, message.map(str::to_string)));
    }

    pub fn recover(&self) {
        *self.fail_with.lock().expect("lock") = None;
    }

    /// Body the server answers an update with, when it differs from the
    /// request.
    pub fn answer_updates_with(&self, response: UserInfo) {
        *self.update_response.lock().expect("lock") = Some(response);
    }

    pub fn list_calls(&self) -> Vec<PageRequest> {
        self.list_calls.lock().expect("lock").clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn failure(&self) -> Option<ClientError> {
        self.fail_with
            .lock()
            .expect("lock")
            .as_ref()
            .map(|(status, message)| ClientError::status(*status, message.as_deref()))
    }

    fn record(&self) -> Result<UserInfo, ClientError> {
        self.record
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| ClientError::status(404, Some("user not found")))
    }
}

#[async_trait]
impl RemoteResource<Users> for FakeUsers {
    async fn list(&self, request: PageRequest) -> Result<PageResult<UserListItem>, ClientError> {
        self.list_calls.lock().expect("lock").push(request);
        let step = self.list_script.lock().expect("lock").pop_front();
        let Some(step) = step else {
            return Ok(page_of(request.page, request.take, 0, &[]));
        };
        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        step.result
            .map_err(|(status, message)| ClientError::status(status, message.as_deref()))
    }

    async fn get(&self, id: &UserId) -> Result<UserInfo, ClientError> {
        self.calls.lock().expect("lock").push(format!("get {id}"));
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.record()
    }

    async fn create(&self, payload: &CreateUserRequest) -> Result<UserInfo, ClientError> {
        self.calls
            .lock()
            .expect("lock")
            .push(format!("create {}", payload.email));
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(UserInfo {
            id: UserId::from("new"),
            email: payload.email.clone(),
            nickname: Some(payload.nickname.clone()),
            trading_view_email: None,
            discord_id: None,
            country_code: None,
            tel: None,
        })
    }

    async fn update(
        &self,
        id: &UserId,
        _payload: &UpdateUserRequest,
    ) -> Result<UserInfo, ClientError> {
        self.calls.lock().expect("lock").push(format!("update {id}"));
        if let Some(err) = self.failure() {
            return Err(err);
        }
        let response = self.update_response.lock().expect("lock").clone();
        match response {
            Some(response) => Ok(response),
            None => self.record(),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), ClientError> {
        self.calls.lock().expect("lock").push(format!("delete {id}"));
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn user_item(id: &str) -> UserListItem {
    UserListItem {
        id: UserId::from(id),
        email: format!("{id}@example.com"),
        role: None,
        nickname: Some(id.to_uppercase()),
        trading_view_email: None,
        discord_id: None,
    }
}

pub fn page_of(page: u32, take: u32, total_items: u64, ids: &[&str]) -> PageResult<UserListItem> {
    PageResult {
        items: ids.iter().map(|id| user_item(id)).collect(),
        page,
        take,
        total_items,
    }
}

pub fn user_info(id: &str, nickname: &str, email: &str) -> UserInfo {
    UserInfo {
        id: UserId::from(id),
        email: email.to_string(),
        nickname: Some(nickname.to_string()),
        trading_view_email: None,
        discord_id: None,
        country_code: None,
        tel: None,
    }
}
