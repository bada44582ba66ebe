#![forbid(unsafe_code)]

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub(crate) const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransportMode {
    NewlineJson,
    ContentLength,
}

/// One Content-Length framed message plus the credential from its header block.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) body: Vec<u8>,
    pub(crate) authorization: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FrameRead {
    Frame(Frame),
    /// The declared body was larger than `MAX_FRAME_BYTES` and was discarded.
    TooLarge(usize),
    /// The header block was unusable. Any body that followed it is left unread.
    Invalid(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineRead {
    Line(String),
    /// The line exceeded `MAX_FRAME_BYTES` and was consumed through its newline.
    TooLong(usize),
}

const DISCARD_CHUNK: u64 = 64 * 1024;

/// Reads one line, buffering at most `MAX_FRAME_BYTES + 1` bytes of it.
/// Returns `None` on EOF.
pub(crate) async fn read_bounded_line<R>(reader: &mut R) -> std::io::Result<Option<LineRead>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_FRAME_BYTES as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if buf.len() <= MAX_FRAME_BYTES || buf.ends_with(b"\n") {
        return Ok(Some(LineRead::Line(String::from_utf8_lossy(&buf).into_owned())));
    }

    let mut total = buf.len();
    loop {
        buf.clear();
        let n = (&mut *reader)
            .take(DISCARD_CHUNK)
            .read_until(b'\n', &mut buf)
            .await?;
        total += n;
        if n == 0 || buf.ends_with(b"\n") {
            break;
        }
    }
    Ok(Some(LineRead::TooLong(total)))
}

pub(crate) fn detect_mode_from_first_line(line: &str) -> Option<TransportMode> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Some(TransportMode::NewlineJson);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("content-length:")
        || lower.starts_with("content-type:")
        || lower.starts_with("authorization:")
    {
        return Some(TransportMode::ContentLength);
    }
    None
}

fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.trim().split_once(':')?;
    key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
}

pub(crate) fn parse_content_length_header(line: &str) -> Option<usize> {
    header_value(line, "content-length")?.parse::<usize>().ok()
}

pub(crate) fn parse_authorization_header(line: &str) -> Option<String> {
    header_value(line, "authorization").map(str::to_string)
}

/// Reads the rest of a header block starting at `first_header`, then the body.
/// Returns `None` on EOF.
pub(crate) async fn read_content_length_frame<R>(
    reader: &mut R,
    first_header: String,
) -> std::io::Result<Option<FrameRead>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut authorization: Option<String> = None;
    let mut header = first_header;

    loop {
        if header.trim_end().is_empty() {
            break;
        }
        if content_length.is_none() {
            content_length = parse_content_length_header(&header);
        }
        if authorization.is_none() {
            authorization = parse_authorization_header(&header);
        }

        header = match read_bounded_line(reader).await? {
            None => return Ok(None),
            Some(LineRead::Line(line)) => line,
            Some(LineRead::TooLong(_)) => {
                return Ok(Some(FrameRead::Invalid("Header line too large")));
            }
        };
    }

    let Some(len) = content_length else {
        return Ok(Some(FrameRead::Invalid("Missing Content-Length header")));
    };
    if len > MAX_FRAME_BYTES {
        let discarded = tokio::io::copy(&mut (&mut *reader).take(len as u64), &mut tokio::io::sink()).await?;
        if discarded < len as u64 {
            return Ok(None);
        }
        return Ok(Some(FrameRead::TooLarge(len)));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(FrameRead::Frame(Frame {
        body,
        authorization,
    })))
}

pub(crate) async fn write_newline_json<W>(writer: &mut W, resp: &Value) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(resp)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

pub(crate) async fn write_content_length_json<W>(writer: &mut W, resp: &Value) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(resp)?;
    writer
        .write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
        .await?;
    writer.write_all(&body).await?;
    writer.flush().await
}
