//! Single-writer owner of the analysis lifecycle.
//!
//! User events and dispatch resolutions are funnelled through one task, so
//! the state machine is never mutated from two places at once.

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    dispatch::SubmissionDispatcher,
    error::{DispatchError, Result, ValidationError, ViralscopeError},
    navigation::{NavigationState, ResultSection},
    request::{AnalysisRequest, InputDraft},
    state::{AnalysisState, AnalysisStateMachine, Resolution, SubmissionTicket, SubmitRejected},
    types::{AnalysisResult, SubmissionKind},
};

const COMMAND_BUFFER: usize = 32;

/// What a viewer needs to render the session at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub state: AnalysisState,
    pub navigation: NavigationState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    SelectTab(SubmissionKind),
    SelectSection(ResultSection),
    ToggleTimeline(usize),
    ToggleSummarySection(String),
}

enum Command {
    Submit {
        request: AnalysisRequest,
        reply: oneshot::Sender<std::result::Result<SubmissionTicket, SubmitRejected>>,
    },
    RejectInput {
        error: ValidationError,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Back {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Navigate {
        command: NavigationCommand,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

struct Resolved {
    ticket: SubmissionTicket,
    outcome: std::result::Result<AnalysisResult, DispatchError>,
}

pub struct Session {
    machine: AnalysisStateMachine,
    dispatcher: SubmissionDispatcher,
    commands: mpsc::Receiver<Command>,
    resolved_tx: mpsc::UnboundedSender<Resolved>,
    resolved_rx: mpsc::UnboundedReceiver<Resolved>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Session {
    /// Start the session task. It stops on [`SessionHandle::shutdown`] or
    /// once every handle is dropped.
    pub fn spawn(dispatcher: SubmissionDispatcher) -> (SessionHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(SessionSnapshot::default());

        let session = Session {
            machine: AnalysisStateMachine::new(),
            dispatcher,
            commands,
            resolved_tx,
            resolved_rx,
            snapshots,
        };
        let task = tokio::spawn(session.run());

        (
            SessionHandle {
                commands: commands_tx,
                snapshots: snapshots_rx,
            },
            task,
        )
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                Some(resolved) = self.resolved_rx.recv() => {
                    let resolution = self.machine.resolve(resolved.ticket, resolved.outcome);
                    if resolution == Resolution::Applied {
                        self.publish();
                    }
                }
            }
        }
        debug!("session stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit { request, reply } => {
                let accepted = self.machine.submit(&request);
                if let Ok(ticket) = accepted {
                    self.publish();
                    self.start_dispatch(ticket, request);
                }
                let _ = reply.send(accepted);
            }
            Command::RejectInput { error, reply } => {
                if self.machine.reject_input(error) {
                    self.publish();
                }
                let _ = reply.send(self.snapshot());
            }
            Command::Back { reply } => {
                if self.machine.back() {
                    self.publish();
                }
                let _ = reply.send(self.snapshot());
            }
            Command::Navigate { command, reply } => {
                let nav = self.machine.navigation_mut();
                match command {
                    NavigationCommand::SelectTab(tab) => nav.select_tab(tab),
                    NavigationCommand::SelectSection(section) => nav.select_section(section),
                    NavigationCommand::ToggleTimeline(index) => nav.toggle_timeline(index),
                    NavigationCommand::ToggleSummarySection(key) => nav.toggle_summary_section(key),
                }
                self.publish();
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn start_dispatch(&self, ticket: SubmissionTicket, request: AnalysisRequest) {
        let dispatcher = self.dispatcher.clone();
        let resolved_tx = self.resolved_tx.clone();
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&request).await;
            if resolved_tx.send(Resolved { ticket, outcome }).is_err() {
                info!(generation = ticket.generation, "session gone before response arrived");
            }
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.machine.state().clone(),
            navigation: self.machine.navigation().clone(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

/// Cloneable front door to a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| ViralscopeError::SessionClosed)?;
        rx.await.map_err(|_| ViralscopeError::SessionClosed)
    }

    /// Submit an already-built request. Refused while another is in flight.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<SubmissionTicket> {
        let accepted = self
            .request(|reply| Command::Submit { request, reply })
            .await?;
        Ok(accepted?)
    }

    /// Build the request for `kind` from `draft` and submit it. Build failures
    /// are recorded in the session and returned.
    pub async fn submit_draft(
        &self,
        draft: &InputDraft,
        kind: SubmissionKind,
    ) -> Result<SubmissionTicket> {
        match draft.build(kind) {
            Ok(request) => self.submit(request).await,
            Err(error) => {
                self.request(|reply| Command::RejectInput {
                    error: error.clone(),
                    reply,
                })
                .await?;
                Err(error.into())
            }
        }
    }

    pub async fn back(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Back { reply }).await
    }

    pub async fn navigate(&self, command: NavigationCommand) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Navigate { command, reply })
            .await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until nothing is loading and return that snapshot.
    pub async fn wait_settled(&self) -> Result<SessionSnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|snapshot| !snapshot.state.is_loading())
            .await
            .map_err(|_| ViralscopeError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::{
        dispatch::{RawResponse, Transport},
        error::AnalysisError,
        validate::{DocumentFile, MIME_PDF},
    };

    /// Holds every request until the test hands out a permit.
    struct GatedTransport {
        gate: Semaphore,
    }

    impl GatedTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                gate: Semaphore::new(0),
            })
        }

        fn release(&self, n: usize) {
            self.gate.add_permits(n);
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(
            &self,
            request: &AnalysisRequest,
        ) -> std::result::Result<RawResponse, DispatchError> {
            self.gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
            let summary = match request.kind() {
                SubmissionKind::Youtube => "from youtube",
                SubmissionKind::Document => "from document",
            };
            let body = json!({
                "summary": summary,
                "viral_score": 61,
                "viral_label": "Good Potential",
                "viral_explanation": "",
                "recommendations": {
                    "title": "t", "target_audience": "a", "content_style": "c",
                    "estimated_viral_score": 50
                }
            });
            Ok(RawResponse {
                status: 200,
                body: serde_json::to_vec(&body).unwrap(),
            })
        }
    }

    fn youtube_draft() -> InputDraft {
        let mut draft = InputDraft::new();
        draft.set_url("https://youtu.be/abc").unwrap();
        draft
    }

    fn document_draft() -> InputDraft {
        let mut draft = InputDraft::new();
        draft
            .set_file(DocumentFile::new("a.pdf", MIME_PDF, b"%PDF".to_vec()))
            .unwrap();
        draft
    }

    #[tokio::test]
    async fn concurrent_submit_is_refused_then_result_lands() {
        let transport = GatedTransport::new();
        let (session, _task) = Session::spawn(SubmissionDispatcher::new(transport.clone()));

        let ticket = session
            .submit_draft(&youtube_draft(), SubmissionKind::Youtube)
            .await
            .unwrap();
        assert!(session.snapshot().state.is_loading());

        let second = session
            .submit_draft(&youtube_draft(), SubmissionKind::Youtube)
            .await;
        assert!(matches!(
            second,
            Err(ViralscopeError::Rejected(SubmitRejected::InFlight { ticket: t })) if t == ticket
        ));

        transport.release(1);
        let settled = session.wait_settled().await.unwrap();
        assert!(matches!(
            settled.state,
            AnalysisState::Success {
                kind: SubmissionKind::Youtube,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn abandoned_response_does_not_overwrite_newer_submission() {
        let transport = GatedTransport::new();
        let (session, _task) = Session::spawn(SubmissionDispatcher::new(transport.clone()));

        session
            .submit_draft(&youtube_draft(), SubmissionKind::Youtube)
            .await
            .unwrap();
        session.back().await.unwrap();
        let second = session
            .submit_draft(&document_draft(), SubmissionKind::Document)
            .await
            .unwrap();

        // Both requests complete; only the document one may land.
        transport.release(2);
        let settled = session.wait_settled().await.unwrap();

        let AnalysisState::Success { result, kind } = settled.state else {
            panic!("expected success, got {:?}", settled.state);
        };
        assert_eq!(kind, SubmissionKind::Document);
        assert_eq!(result.summary(), "from document");
        assert_eq!(second.generation, 2);
    }

    #[tokio::test]
    async fn validation_failure_is_recorded_without_dispatch() {
        let transport = GatedTransport::new();
        let (session, _task) = Session::spawn(SubmissionDispatcher::new(transport));

        let err = session
            .submit_draft(&InputDraft::new(), SubmissionKind::Document)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ViralscopeError::Validation(ValidationError::MissingInput { .. })
        ));
        assert!(matches!(
            session.snapshot().state,
            AnalysisState::Failed {
                error: AnalysisError::Validation(_)
            }
        ));
    }

    #[tokio::test]
    async fn back_resets_navigation() {
        let transport = GatedTransport::new();
        let (session, _task) = Session::spawn(SubmissionDispatcher::new(transport.clone()));

        session
            .submit_draft(&youtube_draft(), SubmissionKind::Youtube)
            .await
            .unwrap();
        transport.release(1);
        session.wait_settled().await.unwrap();

        session
            .navigate(NavigationCommand::SelectSection(ResultSection::Viral))
            .await
            .unwrap();
        let snapshot = session
            .navigate(NavigationCommand::ToggleTimeline(4))
            .await
            .unwrap();
        assert!(snapshot.navigation.is_timeline_expanded(4));

        let snapshot = session.back().await.unwrap();
        assert_eq!(snapshot.state, AnalysisState::Idle);
        assert_eq!(snapshot.navigation, NavigationState::default());
    }

    #[tokio::test]
    async fn shutdown_closes_the_session() {
        let transport = GatedTransport::new();
        let (session, task) = Session::spawn(SubmissionDispatcher::new(transport));

        session.shutdown().await;
        task.await.unwrap();

        assert!(matches!(
            session.back().await,
            Err(ViralscopeError::SessionClosed)
        ));
    }
}
