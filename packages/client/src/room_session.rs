//! One joined room: the local editor and room state, the debounced
//! broadcaster for local changes and the channel feeding remote ones.
//!
//! Local operations and remote events take the same view lock, so a remote
//! event is never applied halfway through a local edit.

use std::sync::{Arc, Mutex, MutexGuard};

use coderoom_server::{
    domain::{
        CodeChange, FileDescriptor, FileSelection, LanguageId, Mutation, MutationEvent,
        MutationKind, RoomId, TerminalsSnapshot, Timestamp, UserId, language,
    },
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto, SaveFileRequest, SavedFileDto},
};
use coderoom_shared::time::Clock;
use tokio::sync::mpsc;

use crate::{
    api::{ApiClient, RelayPublisher},
    broadcaster::Broadcaster,
    channel::ChannelHandle,
    editor::{BufferEditor, EditorSurface, Position},
    error::ClientError,
    executor::{CodeExecutor, terminal_output},
    notification::Notification,
    reconcile::{Applied, LocalRoomState, ReconciliationEngine},
    session::{IdentityGuard, SessionContext},
};

/// Local editor plus the rest of the shared state
#[derive(Debug)]
pub struct RoomView {
    pub editor: BufferEditor,
    pub state: LocalRoomState,
}

/// A remote change that was applied, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNotice {
    pub kind: MutationKind,
    pub origin: UserId,
    pub message: Option<String>,
}

pub struct RoomSession {
    room_id: RoomId,
    room_name: String,
    session: SessionContext,
    api: ApiClient,
    executor: Arc<dyn CodeExecutor>,
    clock: Arc<dyn Clock>,
    engine: Arc<ReconciliationEngine>,
    view: Arc<Mutex<RoomView>>,
    broadcaster: Broadcaster,
    channel: Option<ChannelHandle>,
    notices_tx: mpsc::UnboundedSender<RemoteNotice>,
    notices_rx: Option<mpsc::UnboundedReceiver<RemoteNotice>>,
}

impl RoomSession {
    /// Hydrate a session from the room snapshot. Requires a signed-in identity.
    pub fn new(
        snapshot: RoomDetailDto,
        session: SessionContext,
        api: ApiClient,
        publisher: Arc<dyn RelayPublisher>,
        executor: Arc<dyn CodeExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        let identity = session.current()?;
        let room_id = RoomId::new(snapshot.id.clone())?;
        let room_name = snapshot.name.clone();
        let (state, code) = LocalRoomState::from_snapshot(snapshot)?;

        let broadcaster = Broadcaster::new(
            room_id.clone(),
            IdentityGuard::new(session.clone()),
            publisher,
        );
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        Ok(Self {
            room_id,
            room_name,
            session,
            api,
            executor,
            clock,
            engine: Arc::new(ReconciliationEngine::new(identity.user_id)),
            view: Arc::new(Mutex::new(RoomView {
                editor: BufferEditor::new(code),
                state,
            })),
            broadcaster,
            channel: None,
            notices_tx,
            notices_rx: Some(notices_rx),
        })
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Receiver of applied remote changes; available once.
    pub fn take_notices(&mut self) -> Option<mpsc::UnboundedReceiver<RemoteNotice>> {
        self.notices_rx.take()
    }

    /// Start applying events from `channel`. A previous channel is torn down.
    pub fn attach(&mut self, channel: ChannelHandle) {
        if let Some(previous) = self.channel.take() {
            previous.unsubscribe_all();
        }
        for kind in MutationKind::ALL {
            let view = self.view.clone();
            let engine = self.engine.clone();
            let clock = self.clock.clone();
            let notices = self.notices_tx.clone();
            channel.bind(kind, move |event| {
                if let Some(notice) = apply_remote(&view, &engine, clock.as_ref(), event) {
                    let _ = notices.send(notice);
                }
            });
        }
        self.channel = Some(channel);
    }

    /// Replace local state with a fresh room snapshot, e.g. after a reconnect.
    pub fn hydrate(&self, snapshot: RoomDetailDto) -> Result<(), ClientError> {
        let (state, code) = LocalRoomState::from_snapshot(snapshot)?;
        let mut view = self.lock_view();
        let cursor = view.editor.position();
        view.editor.set_value(&code);
        view.editor.set_position(cursor);
        view.state = LocalRoomState {
            notification: view.state.notification.take(),
            ..state
        };
        Ok(())
    }

    /// Apply a remote event as if it came from the channel.
    pub fn handle_remote(&self, event: &MutationEvent) -> Option<RemoteNotice> {
        apply_remote(&self.view, &self.engine, self.clock.as_ref(), event)
    }

    /// Resolves when the attached channel loses its connection.
    pub async fn disconnected(&self) {
        match &self.channel {
            Some(channel) => channel.disconnected().await,
            None => std::future::pending().await,
        }
    }

    // ========================================
    // Local operations
    // ========================================

    /// Replace the whole buffer, e.g. after typing into an empty editor.
    pub fn set_code(&self, code: &str) {
        let mut view = self.lock_view();
        view.editor.set_value(code);
        let line_count = view.editor.line_count();
        view.editor.set_position(Position::new(line_count, u32::MAX));
        drop(view);
        self.broadcast_code(code.to_string(), 0);
    }

    pub fn insert_line(&self, at: u32, content: &str) -> u32 {
        self.edit(|editor| Some(editor.insert_line(at, content)))
            .unwrap_or(at)
    }

    pub fn append_line(&self, content: &str) -> u32 {
        self.edit(|editor| Some(editor.append_line(content)))
            .unwrap_or_default()
    }

    pub fn replace_line(&self, at: u32, content: &str) -> Result<u32, ClientError> {
        self.edit(|editor| editor.replace_line(at, content))
            .ok_or_else(|| ClientError::InvalidInput(format!("line {} does not exist", at)))
    }

    pub fn delete_line(&self, at: u32) -> Result<u32, ClientError> {
        self.edit(|editor| editor.delete_line(at))
            .ok_or_else(|| ClientError::InvalidInput(format!("line {} does not exist", at)))
    }

    /// Switch language; the buffer is reset to the language's starter code.
    pub fn change_language(&self, language: &str) -> Result<(), ClientError> {
        let spec = language::find(language).ok_or_else(|| {
            ClientError::InvalidInput(format!("unsupported language '{}'", language))
        })?;
        let language = LanguageId::new(spec.id)?;

        let mut view = self.lock_view();
        view.state.language = language.clone();
        view.editor.set_value(spec.boilerplate);
        drop(view);

        self.broadcaster.broadcast(Mutation::Language(language));
        Ok(())
    }

    pub fn change_input(&self, input: &str) {
        let snapshot = {
            let mut view = self.lock_view();
            view.state.terminals.input = input.to_string();
            view.state.terminals.clone()
        };
        self.broadcaster.broadcast(Mutation::Terminals(snapshot));
    }

    /// Run the buffer in the sandbox and share the result. Returns the output text.
    pub async fn run(&self) -> String {
        let (language, code, stdin, loading) = {
            let mut view = self.lock_view();
            // the previous output stays visible until the new one arrives
            view.state.terminals.is_loading = true;
            (
                view.state.language.clone(),
                view.editor.value(),
                view.state.terminals.input.clone(),
                view.state.terminals.clone(),
            )
        };
        self.broadcaster.broadcast(Mutation::Terminals(loading));

        let result = match language::find(language.as_str()) {
            Some(spec) => {
                self.executor
                    .execute(spec.id, spec.version, &code, &stdin)
                    .await
            }
            None => Err(ClientError::ExecutionError(format!(
                "no runtime for '{}'",
                language
            ))),
        };
        if let Err(e) = &result {
            tracing::warn!("Run failed: {}", e);
        }
        let output = terminal_output(&result);

        let finished = {
            let mut view = self.lock_view();
            view.state.terminals.output = output.clone();
            view.state.terminals.is_loading = false;
            view.state.terminals.clone()
        };
        self.broadcaster.broadcast(Mutation::Terminals(finished));
        output
    }

    /// Open `file` locally and tell the room about it.
    pub fn select_file(&self, file: FileDescriptor) {
        {
            let mut view = self.lock_view();
            view.state.language = file.language.clone();
            view.state.active_file = Some(file.clone());
            view.editor.set_value(&file.content);
        }
        let opened_by = self
            .session
            .current()
            .ok()
            .map(|identity| identity.username);
        self.broadcaster
            .broadcast(Mutation::FileSelection(FileSelection { file, opened_by }));
    }

    /// Save the buffer as `{name}.{extension}` of the current language.
    pub async fn save(&self, name: &str) -> Result<SavedFileDto, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput(
                "file name must not be empty".to_string(),
            ));
        }
        let identity = self.session.current()?;
        let request = {
            let view = self.lock_view();
            SaveFileRequest {
                name: language::file_name(name, view.state.language.as_str()),
                content: view.editor.value(),
                language: view.state.language.to_string(),
                room_id: self.room_id.to_string(),
            }
        };
        self.api.save_file(&identity, &request).await
    }

    pub async fn list_files(&self) -> Result<Vec<SavedFileDto>, ClientError> {
        let identity = self.session.current()?;
        self.api.list_files(&identity, &self.room_id).await
    }

    /// Every room on the relay, for picking another one to join.
    pub async fn list_rooms(&self) -> Result<Vec<RoomSummaryDto>, ClientError> {
        self.api.list_rooms().await
    }

    /// Open a saved file of this room by name.
    pub async fn open_saved(&self, name: &str) -> Result<FileDescriptor, ClientError> {
        let files = self.list_files().await?;
        let saved = files
            .into_iter()
            .rev()
            .find(|file| file.name == name)
            .ok_or_else(|| ClientError::InvalidInput(format!("no saved file '{}'", name)))?;
        let file = FileDescriptor {
            name: saved.name,
            language: LanguageId::new(saved.language)?,
            content: saved.content,
        };
        self.select_file(file.clone());
        Ok(file)
    }

    // ========================================
    // Inspection
    // ========================================

    pub fn code(&self) -> String {
        self.lock_view().editor.value()
    }

    pub fn cursor(&self) -> Position {
        self.lock_view().editor.position()
    }

    pub fn set_cursor(&self, position: Position) {
        self.lock_view().editor.set_position(position);
    }

    pub fn language(&self) -> LanguageId {
        self.lock_view().state.language.clone()
    }

    pub fn terminals(&self) -> TerminalsSnapshot {
        self.lock_view().state.terminals.clone()
    }

    pub fn active_file(&self) -> Option<FileDescriptor> {
        self.lock_view().state.active_file.clone()
    }

    pub fn notification(&self) -> Option<Notification> {
        let now = self.clock.now_millis();
        self.lock_view().state.visible_notification(now).cloned()
    }

    /// Cancel pending broadcasts and release the channel. Safe to call twice.
    pub fn teardown(&mut self) {
        self.broadcaster.cancel_all();
        if let Some(channel) = self.channel.take() {
            channel.unsubscribe_all();
        }
    }

    fn edit<F>(&self, f: F) -> Option<u32>
    where
        F: FnOnce(&mut BufferEditor) -> Option<u32>,
    {
        let (line, code) = {
            let mut view = self.lock_view();
            let line = f(&mut view.editor)?;
            (line, view.editor.value())
        };
        self.broadcast_code(code, line);
        Some(line)
    }

    fn broadcast_code(&self, code: String, change_line_number: u32) {
        self.broadcaster.broadcast(Mutation::Code(CodeChange {
            code,
            change_line_number,
            timestamp: Timestamp::new(self.clock.now_millis()),
        }));
    }

    fn lock_view(&self) -> MutexGuard<'_, RoomView> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn apply_remote(
    view: &Mutex<RoomView>,
    engine: &ReconciliationEngine,
    clock: &dyn Clock,
    event: &MutationEvent,
) -> Option<RemoteNotice> {
    let mut view = view.lock().unwrap_or_else(|e| e.into_inner());
    let RoomView { editor, state } = &mut *view;

    let applied = match engine.apply(state, &mut *editor, event, clock.now_millis()) {
        Ok(applied) => applied,
        Err(reason) => {
            tracing::trace!("{} from {} discarded: {:?}", event.kind(), event.origin, reason);
            return None;
        }
    };

    let message = match applied {
        // the buffer has no separate render step, so the view is restored right away
        Applied::Code(restore) => {
            restore.finish(&mut *editor);
            None
        }
        Applied::FileSelection => state.notification.as_ref().map(|n| n.message.clone()),
        Applied::Language | Applied::Terminals => None,
    };
    tracing::debug!("Applied {} from {}", event.kind(), event.origin);

    Some(RemoteNotice {
        kind: event.kind(),
        origin: event.origin.clone(),
        message,
    })
}
