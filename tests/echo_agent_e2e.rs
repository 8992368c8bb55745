//! End-to-end runs of the studio against a live echo agent.

use a2a_studio::{HttpConnector, PartKind, Studio, TaskStatus};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn studio_for_echo_agent() -> Studio {
    let addr = echo_agent::spawn("127.0.0.1:0").await.unwrap();
    let mut studio = Studio::new(Arc::new(HttpConnector::default()));

    let info = studio.connect(&format!("http://{addr}")).await.unwrap();
    assert_eq!(info.name, "Echo Agent Demo");
    assert!(info.validation.is_valid(), "{:?}", info.validation.errors);
    assert_eq!(info.skills.len(), 2);
    studio
}

#[tokio::test]
async fn plain_text_is_echoed() {
    let mut studio = studio_for_echo_agent().await;

    let turn = studio.send("hello there").await.unwrap();
    assert_eq!(turn.text, "ECHO MESSAGE: hello there");
    assert!(turn.task.is_none());

    let card = studio.agent_card_json().unwrap();
    assert!(card.contains("Echo Agent Demo"));
}

#[tokio::test]
async fn task_directive_returns_rich_artifact() {
    let mut studio = studio_for_echo_agent().await;

    let turn = studio.send("TASK: draw a chart").await.unwrap().clone();

    assert_eq!(turn.text, "ECHO TASK COMPLETED: draw a chart");
    let link = turn.task.clone().unwrap();
    assert_eq!(link.status, TaskStatus::Completed);

    let kinds: Vec<PartKind> = turn.parts.iter().map(|p| p.kind()).collect();
    assert_eq!(kinds, vec![PartKind::Text, PartKind::File, PartKind::Data]);
    assert!(turn.parts[1].is_svg());
    assert!(turn.parts[1].size().unwrap_or_default() > 0);

    assert_eq!(studio.turns()[0].task_id(), Some(link.task_id.as_str()));
    assert!(studio.available_tasks().is_empty());
}

#[tokio::test]
async fn working_task_accepts_a_follow_up() {
    let mut studio = studio_for_echo_agent().await;

    let started = studio.send("TASK(working): plan the trip").await.unwrap().clone();
    let link = started.task.unwrap();
    assert_eq!(link.status, TaskStatus::Working);
    assert_eq!(studio.selected_task(), Some(link.task_id.as_str()));

    let finished = studio.send("book the hotel").await.unwrap().clone();
    assert_eq!(finished.text, "ECHO TASK COMPLETED: book the hotel");
    assert_eq!(finished.task_id(), Some(link.task_id.as_str()));
    assert_eq!(finished.task.unwrap().status, TaskStatus::Completed);

    assert_eq!(studio.task_turns(&link.task_id).len(), 4);
    assert_eq!(studio.selected_task(), None);
}

#[tokio::test]
async fn rejected_directive_surfaces_as_error_turn() {
    let mut studio = studio_for_echo_agent().await;

    assert!(studio.send("TASK(sleeping): nap").await.is_err());
    let last = studio.turns().last().unwrap();
    assert!(last.is_error);
    assert!(last.text.starts_with("Error: "), "{}", last.text);
}
