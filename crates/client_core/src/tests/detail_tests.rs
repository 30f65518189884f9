use shared::{domain::UserId, protocol::UpdateUserRequest};

use super::*;
use crate::{
    notice::{NoticeLevel, Notifier},
    resource::Users,
    test_support::{user_info, FakeUsers},
};

fn controller(remote: &Arc<FakeUsers>, id: Option<&str>) -> DetailController<Users> {
    DetailController::new(remote.clone(), Notifier::new(), id.map(UserId::from))
}

#[tokio::test]
async fn operations_without_id_do_nothing() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, None);
    let before = detail.state().await;

    assert_eq!(detail.load().await, Outcome::Skipped);
    assert_eq!(
        detail.update(UpdateUserRequest::nickname("B")).await,
        Outcome::Skipped
    );
    assert_eq!(detail.remove().await, Outcome::Skipped);

    assert!(remote.calls().is_empty());
    assert_eq!(detail.state().await, before);
}

#[tokio::test]
async fn load_stores_snapshot() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, Some("u1"));

    assert_eq!(detail.load().await, Outcome::Succeeded);

    let state = detail.state().await;
    assert_eq!(state.snapshot, Some(user_info("u1", "A", "a@x.com")));
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn load_failure_records_error_and_leaves_snapshot_empty() {
    let remote = Arc::new(FakeUsers::default());
    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();
    let detail = DetailController::<Users>::new(remote.clone(), notifier, Some("u1".into()));

    assert_eq!(detail.load().await, Outcome::Failed);

    let state = detail.state().await;
    assert_eq!(state.snapshot, None);
    assert_eq!(state.error.as_deref(), Some("user not found"));
    assert!(!state.loading);
    assert_eq!(notices.try_recv().expect("notice").level, NoticeLevel::Error);
}

#[tokio::test]
async fn update_merges_request_payload_without_refetch() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, Some("u1"));
    detail.load().await;

    assert_eq!(
        detail.update(UpdateUserRequest::nickname("B")).await,
        Outcome::Succeeded
    );

    let state = detail.state().await;
    assert_eq!(state.snapshot, Some(user_info("u1", "B", "a@x.com")));
    assert_eq!(remote.calls(), vec!["get u1", "update u1"]);
}

#[tokio::test]
async fn update_ignores_server_derived_fields() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let mut derived = user_info("u1", "B", "a@x.com");
    derived.tel = Some("+886-2-0000".into());
    remote.answer_updates_with(derived);
    let detail = controller(&remote, Some("u1"));
    detail.load().await;

    detail.update(UpdateUserRequest::nickname("B")).await;

    let snapshot = detail.state().await.snapshot.expect("snapshot");
    assert_eq!(snapshot.nickname.as_deref(), Some("B"));
    assert_eq!(snapshot.tel, None);
}

#[tokio::test]
async fn update_failure_keeps_snapshot_and_notifies() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let notifier = Notifier::new();
    let detail = DetailController::<Users>::new(remote.clone(), notifier.clone(), Some("u1".into()));
    detail.load().await;
    remote.fail_mutations(500, None);
    let mut notices = notifier.subscribe();

    assert_eq!(
        detail.update(UpdateUserRequest::nickname("B")).await,
        Outcome::Failed
    );

    let state = detail.state().await;
    assert_eq!(state.snapshot, Some(user_info("u1", "A", "a@x.com")));
    assert_eq!(
        state.error.as_deref(),
        Some("Update failed, please try again later.")
    );
    let notice = notices.try_recv().expect("notice");
    assert_eq!(notice.level, NoticeLevel::Error);
}

#[tokio::test]
async fn remove_keeps_snapshot_and_reports_success() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let notifier = Notifier::new();
    let detail = DetailController::<Users>::new(remote.clone(), notifier.clone(), Some("u1".into()));
    detail.load().await;
    let mut notices = notifier.subscribe();

    assert_eq!(detail.remove().await, Outcome::Succeeded);

    assert!(detail.state().await.snapshot.is_some());
    assert_eq!(remote.calls(), vec!["get u1", "delete u1"]);
    let notice = notices.try_recv().expect("notice");
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Delete successful");
}

#[tokio::test]
async fn next_operation_clears_previous_error() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    remote.fail_mutations(503, Some("maintenance"));
    let detail = controller(&remote, Some("u1"));

    detail.load().await;
    assert_eq!(detail.state().await.error.as_deref(), Some("maintenance"));

    remote.recover();
    detail.load().await;
    assert_eq!(detail.state().await.error, None);
}

#[tokio::test]
async fn rebinding_drops_old_snapshot() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, Some("u1"));
    detail.load().await;

    detail.bind(Some("u1".into())).await;
    assert!(detail.state().await.snapshot.is_some());

    detail.bind(Some("u2".into())).await;
    let state = detail.state().await;
    assert_eq!(state.id, Some(UserId::from("u2")));
    assert_eq!(state.snapshot, None);
}

#[tokio::test]
async fn unbind_turns_operations_into_no_ops() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, Some("u1"));
    detail.load().await;

    detail.unbind().await;

    assert_eq!(detail.remove().await, Outcome::Skipped);
    assert_eq!(remote.calls(), vec!["get u1"]);
    assert_eq!(detail.state().await.snapshot, None);
}

#[tokio::test]
async fn update_before_load_sends_request_but_keeps_snapshot_empty() {
    let remote = Arc::new(FakeUsers::with_record(user_info("u1", "A", "a@x.com")));
    let detail = controller(&remote, Some("u1"));

    assert_eq!(
        detail.update(UpdateUserRequest::nickname("B")).await,
        Outcome::Succeeded
    );

    assert_eq!(remote.calls(), vec!["update u1"]);
    assert_eq!(detail.state().await.snapshot, None);
}
