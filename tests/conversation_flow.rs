//! Studio conversation flows against a scripted agent.

mod common;

use a2a_studio::a2a_types::{Part, TaskState};
use a2a_studio::{ErrorKind, Studio, StudioError, TaskStatus, EMPTY_REPLY_TEXT};
use common::{
    card, message_reply, svg_part, task_reply, text_reply, FakeConnector, FakeTransport,
    PendingTransport,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

async fn connected_studio(transport: Arc<FakeTransport>) -> Studio {
    let mut studio = Studio::new(FakeConnector::new(card("Echo"), transport));
    studio.connect("http://agent.test").await.unwrap();
    studio
}

#[tokio::test]
async fn card_with_blank_name_still_connects() {
    let connector = FakeConnector::new(card(""), FakeTransport::new());
    let mut studio = Studio::new(connector.clone());

    let info = studio.connect("http://agent.test").await.unwrap();

    assert!(studio.is_connected());
    assert!(info.is_connected);
    assert_eq!(info.validation.errors, vec!["Agent name is required"]);
    assert_eq!(connector.fetches(), 1);
}

#[tokio::test]
async fn invalid_urls_never_reach_the_connector() {
    let connector = FakeConnector::new(card("Echo"), FakeTransport::new());
    let mut studio = Studio::new(connector.clone());

    for url in ["", "   ", "agents/echo"] {
        let err = studio.connect(url).await.unwrap_err();
        assert!(matches!(err, StudioError::InvalidInput { .. }), "{url:?}");
    }
    assert_eq!(connector.fetches(), 0);
    assert!(!studio.is_connected());
}

#[tokio::test]
async fn unreachable_agent_reports_connection_error() {
    let mut studio = Studio::new(FakeConnector::unreachable());
    let err = studio.connect("http://down.test").await.unwrap_err();

    assert!(matches!(err, StudioError::Connection { .. }));
    assert!(studio.current_agent().is_none());
    assert!(studio.agent_card_json().is_none());
}

#[tokio::test]
async fn sending_requires_a_connection_and_text() {
    let transport = FakeTransport::new();
    let mut studio = Studio::new(FakeConnector::new(card("Echo"), transport.clone()));

    let err = studio.send("hello").await.unwrap_err();
    assert!(matches!(err, StudioError::NotConnected));
    assert_eq!(err.kind(), ErrorKind::Send);
    assert_eq!(err.to_string(), "Not connected to any agent");
    assert!(studio.turns().is_empty());

    studio.connect("http://agent.test").await.unwrap();
    let err = studio.send("  \n").await.unwrap_err();
    assert!(matches!(err, StudioError::EmptyMessage));
    assert!(studio.turns().is_empty());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn plain_reply_is_a_standalone_turn() {
    let transport = FakeTransport::new();
    transport.push_reply(text_reply("ECHO MESSAGE: hi"));
    let mut studio = connected_studio(transport.clone()).await;

    let turn = studio.send("hi").await.unwrap().clone();

    assert_eq!(turn.text, "ECHO MESSAGE: hi");
    assert!(turn.task.is_none());
    assert!(turn.parts.is_empty());
    assert_eq!(studio.turns().len(), 2);
    assert!(studio.turns()[0].is_from_user());
    assert!(studio.turns()[0].task.is_none());
    assert!(!studio.is_busy());

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.text_content(), "hi");
    assert_eq!(sent[0].message.task_id, None);
}

#[tokio::test]
async fn file_reply_becomes_a_completed_task() {
    let transport = FakeTransport::new();
    transport.push_reply(message_reply(vec![Part::text("Here is your chart"), svg_part()]));
    let mut studio = connected_studio(transport).await;

    let turn = studio.send("draw").await.unwrap().clone();

    let link = turn.task.expect("rich reply is linked to a task");
    assert_eq!(link.task_id.len(), 8);
    assert!(link.task_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(link.status, TaskStatus::Completed);
    assert_eq!(turn.text, "Here is your chart");
    assert_eq!(turn.parts.len(), 2);
    assert!(turn.parts[1].is_svg());

    // A completed task is not offered for routing.
    assert!(studio.available_tasks().is_empty());
    assert_eq!(studio.selected_task(), None);
}

#[tokio::test]
async fn repeated_reply_collapses_to_placeholder() {
    let transport = FakeTransport::new();
    transport.push_reply(text_reply("Same answer"));
    transport.push_reply(text_reply("same answer"));
    let mut studio = connected_studio(transport).await;

    assert_eq!(studio.send("one").await.unwrap().text, "Same answer");
    assert_eq!(studio.send("two").await.unwrap().text, EMPTY_REPLY_TEXT);
}

#[tokio::test]
async fn open_task_is_selected_and_receives_follow_ups() {
    let transport = FakeTransport::new();
    transport.push_reply(task_reply(
        "task-1",
        TaskState::Working,
        vec![Part::text("Working on the report")],
    ));
    transport.push_reply(task_reply(
        "task-1",
        TaskState::Completed,
        vec![Part::text("Report finished"), Part::data(json!({"pages": 3}))],
    ));
    let mut studio = connected_studio(transport.clone()).await;

    let first = studio.send("TASK: write the report").await.unwrap().clone();
    assert_eq!(first.task_id(), Some("task-1"));
    assert_eq!(first.task.as_ref().unwrap().status, TaskStatus::Working);

    // The user turn that started the task is linked once the task id is known.
    let opener = &studio.turns()[0];
    assert_eq!(opener.task_id(), Some("task-1"));
    assert_eq!(opener.task.as_ref().unwrap().status, TaskStatus::in_progress());

    let open = studio.available_tasks();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task_id, "task-1");
    assert_eq!(open[0].status, TaskStatus::Working);
    assert_eq!(studio.selected_task(), Some("task-1"));

    let second = studio.send("add a summary").await.unwrap().clone();
    assert_eq!(transport.last_task_id().as_deref(), Some("task-1"));
    assert_eq!(second.task.as_ref().unwrap().status, TaskStatus::Completed);
    assert_eq!(second.parts.len(), 2);

    assert_eq!(studio.task_turns("task-1").len(), 4);
    assert!(studio.available_tasks().is_empty());
    assert_eq!(studio.selected_task(), None);
}

#[tokio::test]
async fn plain_reply_to_selected_task_uses_text_status() {
    let transport = FakeTransport::new();
    transport.push_reply(task_reply(
        "task-7",
        TaskState::InputRequired,
        vec![Part::text("Which format?")],
    ));
    transport.push_reply(text_reply("Export FAILED: unsupported format"));
    let mut studio = connected_studio(transport.clone()).await;

    studio.send("TASK: export").await.unwrap();
    assert_eq!(studio.selected_task(), Some("task-7"));

    let reply = studio.send("xlsx").await.unwrap().clone();
    let link = reply.task.unwrap();
    assert_eq!(link.task_id, "task-7");
    assert_eq!(link.status, TaskStatus::Failed);
    assert_eq!(transport.last_task_id().as_deref(), Some("task-7"));
}

#[tokio::test]
async fn manual_selection_must_name_an_open_task() {
    let transport = FakeTransport::new();
    transport.push_reply(task_reply("task-a", TaskState::Working, vec![Part::text("A started")]));
    transport.push_reply(task_reply("task-b", TaskState::Working, vec![Part::text("B started")]));
    let mut studio = connected_studio(transport.clone()).await;

    studio.send("TASK: a").await.unwrap();
    studio.select_task("task-a").unwrap();
    studio.send("TASK: b").await.unwrap();
    assert_eq!(transport.last_task_id().as_deref(), Some("task-a"));

    // Both tasks are open and the selection stays where it was put.
    assert_eq!(studio.available_tasks().len(), 2);
    assert_eq!(studio.selected_task(), Some("task-a"));
    studio.select_task("task-b").unwrap();
    assert_eq!(studio.selected_task(), Some("task-b"));

    let err = studio.select_task("task-zzz").unwrap_err();
    assert!(matches!(err, StudioError::InvalidInput { .. }));
    assert_eq!(studio.selected_task(), Some("task-b"));
}

#[tokio::test]
async fn transport_failure_is_logged_as_error_turn() {
    let transport = FakeTransport::new();
    transport.push_error(StudioError::Send {
        reason: "connection reset".to_string(),
    });
    transport.push_reply(text_reply("back again"));
    let mut studio = connected_studio(transport).await;

    let err = studio.send("hello").await.unwrap_err();
    assert!(matches!(err, StudioError::Send { .. }));
    assert!(!studio.is_busy());

    let turns = studio.turns();
    assert_eq!(turns.len(), 2);
    assert!(turns[1].is_error);
    assert_eq!(turns[1].text, "Error: Failed to send message: connection reset");
    assert!(turns[1].task.is_none());

    // Error turns are not treated as earlier replies.
    assert_eq!(studio.send("retry").await.unwrap().text, "back again");
}

#[tokio::test]
async fn reconnect_starts_a_fresh_conversation() {
    let transport = FakeTransport::new();
    transport.push_reply(task_reply("task-1", TaskState::Working, vec![Part::text("started")]));
    let connector = FakeConnector::new(card("Echo"), transport);
    let mut studio = Studio::new(connector.clone());

    studio.connect("http://agent.test").await.unwrap();
    studio.send("TASK: go").await.unwrap();
    assert_eq!(studio.selected_task(), Some("task-1"));

    studio.disconnect();
    assert!(!studio.is_connected());
    assert_eq!(studio.turns().len(), 2);

    studio.connect("http://agent.test").await.unwrap();
    assert!(studio.turns().is_empty());
    assert_eq!(studio.selected_task(), None);
    assert_eq!(connector.fetches(), 2);
}

#[tokio::test]
async fn dropped_send_clears_busy_and_records_error() {
    let mut studio = Studio::new(FakeConnector::new(card("Echo"), Arc::new(PendingTransport)));
    studio.connect("http://agent.test").await.unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), studio.send("hello")).await;
    assert!(timed_out.is_err());

    assert!(!studio.is_busy());
    let turns = studio.turns();
    assert_eq!(turns.len(), 2);
    assert!(turns[0].is_from_user());
    assert!(turns[1].is_error);
    assert!(turns[1].text.contains("cancelled"), "{}", turns[1].text);
}
