#![forbid(unsafe_code)]

use super::framing::{
    FrameRead, LineRead, TransportMode, detect_mode_from_first_line, read_bounded_line,
    read_content_length_frame, write_content_length_json, write_newline_json,
};
use crate::McpServer;
use crate::support::jsonrpc::{INVALID_REQUEST, json_rpc_error, parse_request};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

pub(crate) async fn run_stdio(server: &McpServer) -> std::io::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    tracing::info!("serving MCP over stdio");
    serve(server, &mut reader, &mut writer).await?;
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Serves requests until EOF. Framing is detected once from the first
/// non-empty line and kept for the rest of the session.
pub(crate) async fn serve<R, W>(
    server: &McpServer,
    reader: &mut R,
    writer: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut mode: Option<TransportMode> = None;

    loop {
        let line = match read_bounded_line(reader).await? {
            None => break,
            Some(LineRead::Line(line)) => line,
            Some(LineRead::TooLong(bytes)) => {
                tracing::warn!(bytes, "request line too large");
                let resp = json_rpc_error(None, INVALID_REQUEST, "Request too large");
                match mode {
                    Some(TransportMode::ContentLength) => {
                        write_content_length_json(writer, &resp).await?
                    }
                    _ => write_newline_json(writer, &resp).await?,
                }
                continue;
            }
        };

        let current = match mode {
            Some(current) => current,
            None => match detect_mode_from_first_line(&line) {
                Some(detected) => {
                    tracing::debug!(mode = ?detected, "stdio framing detected");
                    mode = Some(detected);
                    detected
                }
                None => continue,
            },
        };

        match current {
            TransportMode::NewlineJson => {
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                if let Some(resp) = handle_body(server, raw.as_bytes(), None).await {
                    write_newline_json(writer, &resp).await?;
                }
            }
            TransportMode::ContentLength => {
                if line.trim().is_empty() {
                    continue;
                }
                match read_content_length_frame(reader, line).await? {
                    None => break,
                    Some(FrameRead::TooLarge(len)) => {
                        tracing::warn!(bytes = len, "frame too large, body discarded");
                        let resp = json_rpc_error(None, INVALID_REQUEST, "Request too large");
                        write_content_length_json(writer, &resp).await?;
                    }
                    Some(FrameRead::Invalid(reason)) => {
                        tracing::warn!(reason, "invalid frame header");
                        let resp = json_rpc_error(None, INVALID_REQUEST, reason);
                        write_content_length_json(writer, &resp).await?;
                    }
                    Some(FrameRead::Frame(frame)) => {
                        let authorization = frame.authorization.as_deref();
                        if let Some(resp) = handle_body(server, &frame.body, authorization).await {
                            write_content_length_json(writer, &resp).await?;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

async fn handle_body(
    server: &McpServer,
    body: &[u8],
    authorization: Option<&str>,
) -> Option<Value> {
    match parse_request(body) {
        Ok(request) => server.handle(request, authorization).await,
        Err(reply) => Some(reply),
    }
}
