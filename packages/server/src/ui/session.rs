//! Per-connection session handler.
//!
//! One session runs per accepted connection:
//! `AwaitingName` (prompt, read the name) → `Active` (receive loop) → `Closed`.
//! The socket's write half is owned by a dedicated writer task that drains the
//! connection's outbox, so replies and relayed messages never interleave mid-frame.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use hiroba_shared::{
    frame::{read_frame, write_frame},
    time::{Clock, format_elapsed, timestamp_to_jst_rfc3339},
};
use tokio::{
    io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::mpsc,
};

use crate::{
    domain::{
        ClientName, ClientRegistry, ConnectionId, NAME_PROMPT, RegisteredClient, Registration,
        SessionError, outbox_channel,
    },
    usecase::RouteMessageUseCase,
};

/// How long queued outbound messages may take to flush after the receive loop ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Run one client session to completion.
///
/// The registry entry created after the name handshake is removed on every
/// exit path before this function returns.
///
/// # Returns
///
/// * `Ok(())` - the peer closed the connection in an orderly way
/// * `Err(SessionError)` - the session ended on a connection-level fault
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    peer: SocketAddr,
    registry: Arc<dyn ClientRegistry>,
    clock: Arc<dyn Clock>,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let (outbox, rx) = outbox_channel();
    let mut writer_task = tokio::spawn(drain_outbox(writer, rx));

    // AwaitingName
    if outbox.try_send(NAME_PROMPT.to_string()).is_err() {
        return Err(SessionError::WriterClosed);
    }
    let name = match read_frame(&mut reader, &mut buf).await {
        Ok(Some(name)) => ClientName::new(name),
        Ok(None) => {
            tracing::info!("{} disconnected before sending a name", peer);
            writer_task.abort();
            return Ok(());
        }
        Err(e) => {
            tracing::warn!("Failed to read name from {}: {}", peer, e);
            writer_task.abort();
            return Err(e.into());
        }
    };

    // Active
    let registration = Registration::new(
        registry.clone(),
        RegisteredClient::new(ConnectionId::generate(), name, outbox, clock.now_millis()),
    );
    let name = registration.client().name.clone();
    let connected_at = registration.client().connected_at;
    tracing::info!("{} connected from {}", name, peer);

    let router = RouteMessageUseCase::new(registry);
    let (result, writer_finished) = tokio::select! {
        result = receive_loop(&mut reader, &mut buf, registration.client(), &router) => (result, false),
        result = &mut writer_task => {
            let err = match result {
                Ok(Err(e)) => SessionError::from(e),
                _ => SessionError::WriterClosed,
            };
            (Err(err), true)
        }
    };

    // Closed
    drop(registration);
    if !writer_finished
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer_task)
            .await
            .is_err()
    {
        tracing::debug!("Outbox of '{}' did not drain in time", name);
        writer_task.abort();
    }
    drop(reader);

    match &result {
        Ok(()) => {}
        Err(SessionError::ConnectionReset) => {
            tracing::warn!("Connection with {} ({}) reset by client.", name, peer)
        }
        Err(e) => tracing::error!("Error handling message from {}: {}", name, e),
    }
    tracing::info!(
        connected_at = %timestamp_to_jst_rfc3339(connected_at),
        duration = %format_elapsed(connected_at, clock.now_millis()),
        "Connection with {} ({}) closed.",
        name,
        peer
    );

    result
}

/// Read frames until the peer closes, routing each one in arrival order.
async fn receive_loop<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    client: &RegisteredClient,
    router: &RouteMessageUseCase,
) -> Result<(), SessionError>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = read_frame(reader, buf).await? {
        tracing::debug!("Received from '{}': {}", client.name, line);
        if let Ok(delivery) = router.execute(client, &line) {
            tracing::trace!("Routed message from '{}': {:?}", client.name, delivery);
        }
    }
    Ok(())
}

/// Write every queued message as a frame; ends when all senders are gone.
async fn drain_outbox<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = rx.recv().await {
        write_frame(&mut writer, &text).await?;
    }
    writer.shutdown().await
}
