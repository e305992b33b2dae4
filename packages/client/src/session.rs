//! Chat client session management.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::mpsc,
};

use hiroba_shared::frame::{read_frame, write_frame};

use super::{error::ClientError, ui};

/// How a session ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user left (Ctrl+C, Ctrl+D, or input closed)
    UserExit,
    /// The server closed the connection
    ServerClosed,
}

impl SessionEnd {
    /// Message shown to the user when the session ends
    pub fn message(&self) -> &'static str {
        match self {
            SessionEnd::UserExit => "Client exiting...",
            SessionEnd::ServerClosed => "Server closed the connection.",
        }
    }
}

/// Run the chat session on an established connection
///
/// Handshake: print nothing until the server's name prompt arrives, read the
/// name from the terminal with that prompt, send it, then enter [`chat`].
pub async fn run_client_session(stream: TcpStream) -> Result<SessionEnd, ClientError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut buf = Vec::new();
    let Some(name_prompt) = read_frame(&mut reader, &mut buf)
        .await
        .map_err(ClientError::receive)?
    else {
        return Ok(SessionEnd::ServerClosed);
    };

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    spawn_input_thread(name_prompt, input_tx);

    let Some(name) = input_rx.recv().await else {
        return Ok(SessionEnd::UserExit);
    };
    write_frame(&mut writer, &name)
        .await
        .map_err(ClientError::send)?;
    println!("Connected to server. You can start sending messages.");

    // Print incoming messages above the input prompt
    let (incoming_tx, mut incoming_rx) = mpsc::unbounded_channel::<String>();
    let prompt = ui::prompt_for(&name);
    tokio::spawn(async move {
        while let Some(message) = incoming_rx.recv().await {
            ui::print_incoming(&message, &prompt);
        }
    });

    chat(reader, writer, input_rx, incoming_tx).await
}

/// Relay input lines to the server and server lines to `incoming` until either side stops.
///
/// # Arguments
///
/// * `reader` - Read side of a connection that has already joined
/// * `writer` - Write side of the same connection; shut down on return
/// * `input_rx` - Lines typed by the user; the channel closing means the user left
/// * `incoming` - Receives every line sent by the server
pub async fn chat<R, W>(
    mut reader: R,
    mut writer: W,
    mut input_rx: mpsc::UnboundedReceiver<String>,
    incoming: mpsc::UnboundedSender<String>,
) -> Result<SessionEnd, ClientError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let mut read_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        loop {
            match read_frame(&mut reader, &mut buf).await {
                Ok(Some(message)) => {
                    if incoming.send(message).is_err() {
                        return Ok(SessionEnd::UserExit);
                    }
                }
                Ok(None) => return Ok(SessionEnd::ServerClosed),
                Err(e) => return Err(ClientError::receive(e)),
            }
        }
    });

    let result = loop {
        tokio::select! {
            read_result = &mut read_task => {
                break read_result.unwrap_or_else(|e| {
                    Err(ClientError::Receive(std::io::Error::other(e)))
                });
            }
            line = input_rx.recv() => match line {
                Some(line) => {
                    if let Err(e) = write_frame(&mut writer, &line).await {
                        tracing::warn!("Failed to send message: {}", e);
                        read_task.abort();
                        break Err(ClientError::send(e));
                    }
                }
                None => {
                    read_task.abort();
                    break Ok(SessionEnd::UserExit);
                }
            }
        }
    };

    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Failed to close connection: {}", e);
    }
    result
}

/// Read terminal input on a blocking thread (rustyline is synchronous).
///
/// The first line read with `name_prompt` is the client name; later lines use
/// the `name> ` prompt and blank lines are skipped. The channel closes on
/// Ctrl+C, Ctrl+D or a terminal error.
fn spawn_input_thread(name_prompt: String, input_tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let mut prompt = name_prompt;
        let mut joined = false;

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if joined {
                        if line.trim().is_empty() {
                            continue;
                        }
                        rl.add_history_entry(line.as_str()).ok();
                    } else {
                        prompt = ui::prompt_for(&line);
                        joined = true;
                    }
                    if input_tx.send(line).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::debug!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::debug!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}
