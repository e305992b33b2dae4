//! Newline-delimited framing for the chat wire protocol.
//!
//! Each frame is one line of UTF-8 text terminated by `\n`. A trailing `\r`
//! is tolerated so that clients such as `telnet` or `nc -C` work unchanged.
//! Invalid UTF-8 is decoded lossily instead of failing the connection.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum payload size of a single frame in bytes (terminator excluded)
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Read one frame from `reader`.
///
/// `buf` is scratch space reused across calls to avoid reallocating per line.
///
/// # Returns
///
/// * `Ok(Some(text))` - one frame without its line terminator
/// * `Ok(None)` - the peer performed an orderly shutdown before sending any byte
/// * `Err(_)` - an I/O fault, or `InvalidData` if the frame exceeds [`MAX_FRAME_LEN`]
pub async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();

    // One extra byte for the terminator; anything beyond that is oversized.
    let limit = (MAX_FRAME_LEN + 2) as u64;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame exceeds {} bytes", MAX_FRAME_LEN),
        ));
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Write `text` as one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(text.len() + 1);
    frame.extend_from_slice(text.as_bytes());
    frame.push(b'\n');

    writer.write_all(&frame).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_frame_splits_lines() {
        // テスト項目: 1 回の受信に複数行が含まれていても 1 行ずつ取り出せる
        // given (前提条件):
        let mut reader: &[u8] = b"hello\n@bob:hi there\n";
        let mut buf = Vec::new();

        // when (操作):
        let first = read_frame(&mut reader, &mut buf).await.unwrap();
        let second = read_frame(&mut reader, &mut buf).await.unwrap();
        let third = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.as_deref(), Some("hello"));
        assert_eq!(second.as_deref(), Some("@bob:hi there"));
        assert_eq!(third, None);
    }

    #[tokio::test]
    async fn test_read_frame_strips_crlf_only() {
        // テスト項目: 行末の CRLF のみが除去され、本文の空白はそのまま残る
        // given (前提条件):
        let mut reader: &[u8] = b"  spaced out \r\n";
        let mut buf = Vec::new();

        // when (操作):
        let frame = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(frame.as_deref(), Some("  spaced out "));
    }

    #[tokio::test]
    async fn test_read_frame_returns_unterminated_tail() {
        // テスト項目: EOF 直前の改行なしの行もフレームとして返される
        // given (前提条件):
        let mut reader: &[u8] = b"last words";
        let mut buf = Vec::new();

        // when (操作):
        let frame = read_frame(&mut reader, &mut buf).await.unwrap();
        let eof = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(frame.as_deref(), Some("last words"));
        assert_eq!(eof, None);
    }

    #[tokio::test]
    async fn test_read_frame_keeps_empty_line() {
        // テスト項目: 空行は EOF ではなく空のフレームとして扱われる
        // given (前提条件):
        let mut reader: &[u8] = b"\n";
        let mut buf = Vec::new();

        // when (操作):
        let frame = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(frame.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_read_frame_decodes_invalid_utf8_lossily() {
        // テスト項目: 不正な UTF-8 は置換文字に変換され、エラーにならない
        // given (前提条件):
        let mut reader: &[u8] = b"caf\xff\n";
        let mut buf = Vec::new();

        // when (操作):
        let frame = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(frame.as_deref(), Some("caf\u{FFFD}"));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_frame() {
        // テスト項目: 上限を超える長さの行は InvalidData エラーになる
        // given (前提条件):
        let payload = vec![b'a'; MAX_FRAME_LEN + 10];
        let mut reader = BufReader::new(payload.as_slice());
        let mut buf = Vec::new();

        // when (操作):
        let result = read_frame(&mut reader, &mut buf).await;

        // then (期待する結果):
        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_read_frame_accepts_frame_at_limit() {
        // テスト項目: ちょうど上限の長さの行は受理される
        // given (前提条件):
        let mut payload = vec![b'a'; MAX_FRAME_LEN];
        payload.extend_from_slice(b"\r\n");
        let mut reader = BufReader::new(payload.as_slice());
        let mut buf = Vec::new();

        // when (操作):
        let frame = read_frame(&mut reader, &mut buf).await.unwrap();

        // then (期待する結果):
        assert_eq!(frame.map(|f| f.len()), Some(MAX_FRAME_LEN));
    }

    #[tokio::test]
    async fn test_write_frame_appends_newline() {
        // テスト項目: 書き込んだテキストの末尾に改行が付与される
        // given (前提条件):
        let mut out: Vec<u8> = Vec::new();

        // when (操作):
        write_frame(&mut out, "Enter your name: ").await.unwrap();

        // then (期待する結果):
        assert_eq!(out, b"Enter your name: \n");
    }
}
