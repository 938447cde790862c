//! Background worker for the generative-AI flows.
//!
//! Requests are fire-and-forget: the app queues a fetch and keeps running;
//! results come back as events on its own single execution context. A
//! dismissal or any other user action never waits on an in-flight fetch,
//! and a late result is still delivered (and, for jokes, still playable).

use tokio::sync::mpsc;

use tranquil_core::{PrioritizeItem, PrioritizedTask};

use crate::ai::AiClient;

#[derive(Debug, Clone)]
pub enum FlowFetch {
    Motivation {
        task_name: String,
        task_description: String,
    },
    Prioritize {
        items: Vec<PrioritizeItem>,
    },
    Joke {
        request_id: u64,
        alarm_description: String,
    },
}

#[derive(Debug, Clone)]
pub enum FlowEvent {
    Motivation { message: String },
    MotivationFailed { message: String },
    Scores { scores: Vec<PrioritizedTask> },
    ScoresFailed { message: String },
    JokeAudio { request_id: u64, data_uri: String },
    JokeFailed { request_id: u64, message: String },
}

pub async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<FlowFetch>,
    tx: mpsc::UnboundedSender<FlowEvent>,
    client: AiClient,
) {
    while let Some(req) = rx.recv().await {
        let tx2 = tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let event = match req {
                FlowFetch::Motivation {
                    task_name,
                    task_description,
                } => match client.motivate_completion(&task_name, &task_description).await {
                    Ok(message) => FlowEvent::Motivation { message },
                    Err(e) => FlowEvent::MotivationFailed {
                        message: format!("{e:#}"),
                    },
                },
                FlowFetch::Prioritize { items } => match client.prioritize_tasks(&items).await {
                    Ok(scores) => FlowEvent::Scores { scores },
                    Err(e) => FlowEvent::ScoresFailed {
                        message: format!("{e:#}"),
                    },
                },
                FlowFetch::Joke {
                    request_id,
                    alarm_description,
                } => match client.sarcastic_snooze(&alarm_description).await {
                    Ok(data_uri) => FlowEvent::JokeAudio {
                        request_id,
                        data_uri,
                    },
                    Err(e) => FlowEvent::JokeFailed {
                        request_id,
                        message: format!("{e:#}"),
                    },
                },
            };
            let _ = tx2.send(event);
        });
    }
}

/// Wire up channels and spawn the worker on the current runtime.
pub fn spawn_worker(
    client: AiClient,
) -> (
    mpsc::UnboundedSender<FlowFetch>,
    mpsc::UnboundedReceiver<FlowEvent>,
) {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, ev_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(req_rx, ev_tx, client));
    (req_tx, ev_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> AiClient {
        AiClient::new("http://127.0.0.1:9", "test-model", Some("k".to_string()))
    }

    #[tokio::test]
    async fn failed_joke_fetch_surfaces_as_error_event() {
        let (tx, mut ev_rx) = spawn_worker(unreachable_client());

        tx.send(FlowFetch::Joke {
            request_id: 7,
            alarm_description: "gym".to_string(),
        })
        .unwrap();

        match ev_rx.recv().await.unwrap() {
            FlowEvent::JokeFailed { request_id, .. } => assert_eq!(request_id, 7),
            other => panic!("expected joke failure event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_motivation_fetch_surfaces_as_error_event() {
        let (tx, mut ev_rx) = spawn_worker(unreachable_client());

        tx.send(FlowFetch::Motivation {
            task_name: "report".to_string(),
            task_description: "quarterly numbers".to_string(),
        })
        .unwrap();

        match ev_rx.recv().await.unwrap() {
            FlowEvent::MotivationFailed { .. } => {}
            other => panic!("expected motivation failure event, got {other:?}"),
        }
    }
}
