//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use coderoom_server::{
    domain::RoomId,
    infrastructure::dto::http::{RoomDetailDto, SigninRequest, SignupRequest},
};
use coderoom_shared::time::SystemClock;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    api::{ApiClient, HttpRelayPublisher},
    channel::ChannelClient,
    command::{self, Command},
    config::{ClientConfig, RoomTarget},
    domain::{requires_sign_in, should_attempt_reconnect},
    editor::Position,
    error::ClientError,
    executor::PistonExecutor,
    formatter::MessageFormatter,
    room_session::RoomSession,
    session::{Identity, SessionContext},
    ui::{print_above_prompt, prompt, redisplay_prompt},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Sign in (or up) with the configured credentials.
pub async fn authenticate(
    api: &ApiClient,
    session: &SessionContext,
    config: &ClientConfig,
) -> Result<Identity, ClientError> {
    let response = match &config.username {
        Some(username) => {
            api.sign_up(&SignupRequest {
                username: username.clone(),
                email: config.email.clone(),
                password: config.password.clone(),
            })
            .await?
        }
        None => {
            api.sign_in(&SigninRequest {
                email: config.email.clone(),
                password: config.password.clone(),
            })
            .await?
        }
    };
    let identity = Identity::try_from(response)?;
    session.sign_in(identity.clone());
    Ok(identity)
}

/// Snapshot of the room to enter, creating it first if asked to.
pub async fn enter_room(
    api: &ApiClient,
    identity: &Identity,
    target: &RoomTarget,
) -> Result<RoomDetailDto, ClientError> {
    match target {
        RoomTarget::Join(room_id) => {
            let room_id = RoomId::new(room_id.as_str())?;
            api.room_details(identity, &room_id).await
        }
        RoomTarget::Create(name) => {
            let room = api.create_room(identity, name).await?;
            tracing::info!("Created room {} ({})", room.name, room.id);
            Ok(room)
        }
    }
}

/// Subscribe and attach, retrying up to the reconnect limit.
async fn connect(
    channel_client: &ChannelClient,
    publisher: &HttpRelayPublisher,
    room: &mut RoomSession,
    wait_first: bool,
) -> Result<(), ClientError> {
    let mut attempt = 0;
    let mut wait = wait_first;

    loop {
        if wait {
            tracing::info!(
                "Reconnecting in {} seconds... (attempt {}/{})",
                RECONNECT_INTERVAL_SECS,
                attempt + 1,
                MAX_RECONNECT_ATTEMPTS
            );
            tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
        }
        wait = true;

        match channel_client.subscribe(room.room_id()).await {
            Ok(channel) => {
                publisher.set_socket_id(channel.socket_id().cloned());
                room.attach(channel);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Connection failed: {}", e);
                attempt += 1;
                if !should_attempt_reconnect(&e, attempt, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to connect after {} attempts. Exiting.",
                        attempt
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Run the CLI client until the user quits
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let target = config.room_target().ok_or_else(|| {
        ClientError::InvalidInput("either --room or --room-name is required".to_string())
    })?;

    let clock = Arc::new(SystemClock);
    let api = ApiClient::new(config.server.clone());
    let session = SessionContext::new(clock.clone());
    let identity = authenticate(&api, &session, &config).await?;
    let snapshot = enter_room(&api, &identity, &target).await?;

    let publisher = HttpRelayPublisher::new(api.clone());
    let channel_client = ChannelClient::from_http_base(api.base_url());
    let mut room = RoomSession::new(
        snapshot,
        session.clone(),
        api.clone(),
        Arc::new(publisher.clone()),
        Arc::new(PistonExecutor::new(config.sandbox_url.clone())),
        clock,
    )?;
    connect(&channel_client, &publisher, &mut room, false).await?;

    let prompt = prompt(room.room_name());
    print!(
        "{}",
        MessageFormatter::format_room_joined(
            room.room_name(),
            room.room_id().as_str(),
            identity.username.as_str()
        )
    );
    print!(
        "{}",
        MessageFormatter::format_buffer(&room.code(), room.language().as_str(), room.cursor())
    );

    // Print remote changes as they are applied
    let notice_task = room.take_notices().map(|mut notices| {
        let prompt = prompt.clone();
        tokio::spawn(async move {
            while let Some(notice) = notices.recv().await {
                print_above_prompt(&MessageFormatter::format_remote_notice(&notice), &prompt);
            }
        })
    });

    let mut input_rx = spawn_readline(prompt.clone());

    enum Step {
        Input(Option<String>),
        Disconnected,
    }

    let result = loop {
        let step = tokio::select! {
            line = input_rx.recv() => Step::Input(line),
            _ = room.disconnected() => Step::Disconnected,
        };

        match step {
            Step::Input(None) => break Ok(()),
            Step::Input(Some(line)) => {
                let command = match command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        print_above_prompt(&MessageFormatter::format_error(&e.to_string()), &prompt);
                        continue;
                    }
                };
                if command == Command::Quit {
                    break Ok(());
                }
                if let Err(e) = execute(&room, command).await {
                    print_above_prompt(&MessageFormatter::format_error(&e.to_string()), &prompt);
                    if requires_sign_in(&e) {
                        break Err(e);
                    }
                    continue;
                }
                redisplay_prompt(&prompt);
            }
            Step::Disconnected => {
                tracing::warn!("Connection lost");
                if let Err(e) = connect(&channel_client, &publisher, &mut room, true).await {
                    break Err(e);
                }
                // events published while disconnected are not replayed
                let identity = match session.current() {
                    Ok(identity) => identity,
                    Err(e) => break Err(e.into()),
                };
                let refreshed = match api.room_details(&identity, room.room_id()).await {
                    Ok(snapshot) => room.hydrate(snapshot),
                    Err(e) => Err(e),
                };
                if let Err(e) = refreshed {
                    tracing::warn!("Failed to refresh room state: {}", e);
                }
                print_above_prompt("\nReconnected.\n", &prompt);
            }
        }
    };

    room.teardown();
    session.logout();
    if let Some(task) = notice_task {
        task.abort();
    }
    result
}

async fn execute(room: &RoomSession, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Show => print_buffer(room),
        Command::Goto { line, column } => {
            room.set_cursor(Position::new(line, column));
            print_buffer(room);
        }
        Command::Insert { line, text } => {
            room.insert_line(line, &text);
        }
        Command::Append(text) => {
            room.append_line(&text);
        }
        Command::Replace { line, text } => {
            room.replace_line(line, &text)?;
        }
        Command::Delete(line) => {
            room.delete_line(line)?;
        }
        Command::Set(code) => room.set_code(&code),
        Command::Language(language) => {
            room.change_language(&language)?;
            print_buffer(room);
        }
        Command::Input(input) => room.change_input(&input),
        Command::Run => {
            println!("running...");
            room.run().await;
            print!("{}", MessageFormatter::format_terminals(&room.terminals()));
        }
        Command::Terminals => {
            print!("{}", MessageFormatter::format_terminals(&room.terminals()));
        }
        Command::Save(name) => {
            let file = room.save(&name).await?;
            print!("{}", MessageFormatter::format_saved_file(&file));
        }
        Command::Files => {
            let files = room.list_files().await?;
            print!("{}", MessageFormatter::format_file_list(&files));
        }
        Command::Open(name) => {
            room.open_saved(&name).await?;
            print_buffer(room);
        }
        Command::Rooms => {
            let rooms = room.list_rooms().await?;
            print!(
                "{}",
                MessageFormatter::format_room_list(&rooms, room.room_id().as_str())
            );
        }
        Command::Help => println!("{}", MessageFormatter::format_help()),
        Command::Quit => {}
    }
    Ok(())
}

fn print_buffer(room: &RoomSession) {
    print!(
        "{}",
        MessageFormatter::format_buffer(&room.code(), room.language().as_str(), room.cursor())
    );
}

/// Read lines on a blocking thread (rustyline is synchronous) and forward them.
fn spawn_readline(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    if input_tx.send(line).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
