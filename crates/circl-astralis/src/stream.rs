// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed frame stream over a streaming query response.
//!
//! Converts a reqwest response byte stream into [`StreamFrame`] items,
//! processing lines strictly in arrival order. Two frames terminate
//! consumption: `end` ends the stream cleanly and `error` yields the
//! server's message as a failure. In both cases every line physically
//! after the terminator -- even ones already buffered from the same
//! network read -- is discarded.

use std::collections::VecDeque;
use std::pin::Pin;

use circl_core::CirclError;
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::frame::{FrameOutcome, StreamFrame, decode_line};
use crate::framer::LineFramer;

/// Boxed stream of typed frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<StreamFrame, CirclError>> + Send>>;

/// Parses a streaming query response into typed frames.
pub fn parse_frame_stream(response: reqwest::Response) -> FrameStream {
    let chunks = response
        .bytes_stream()
        .map(|result| {
            result.map(|bytes| bytes.to_vec()).map_err(|e| CirclError::Transport {
                message: format!("stream read failed: {e}"),
                source: Some(Box::new(e)),
            })
        })
        .boxed();
    frames_from_chunks(chunks)
}

/// Parses an arbitrary chunk stream into typed frames.
///
/// Split out from [`parse_frame_stream`] so the framing contract can be
/// exercised against hand-built chunk sequences.
pub fn frames_from_chunks(chunks: BoxStream<'static, Result<Vec<u8>, CirclError>>) -> FrameStream {
    struct State {
        chunks: BoxStream<'static, Result<Vec<u8>, CirclError>>,
        framer: LineFramer,
        pending: VecDeque<String>,
        done: bool,
    }

    let state = State {
        chunks,
        framer: LineFramer::new(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.done {
                return None;
            }

            // Drain buffered lines before touching the network again so a
            // terminator in an earlier line shadows everything behind it.
            if let Some(line) = st.pending.pop_front() {
                match decode_line(&line) {
                    FrameOutcome::Frame(StreamFrame::End) => {
                        st.done = true;
                        return None;
                    }
                    FrameOutcome::Frame(frame) => return Some((Ok(frame), st)),
                    FrameOutcome::Skip => continue,
                    FrameOutcome::Error(message) => {
                        st.done = true;
                        return Some((Err(CirclError::Api { message, source: None }), st));
                    }
                }
            }

            match st.chunks.next().await {
                Some(Ok(chunk)) => {
                    st.pending.extend(st.framer.push(&chunk));
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(e), st));
                }
                None => {
                    // A trailing partial line was never a complete frame.
                    st.done = true;
                    return None;
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunked(chunks: Vec<&[u8]>) -> BoxStream<'static, Result<Vec<u8>, CirclError>> {
        let owned: Vec<Result<Vec<u8>, CirclError>> =
            chunks.into_iter().map(|c| Ok(c.to_vec())).collect();
        stream::iter(owned).boxed()
    }

    async fn collect(stream: FrameStream) -> Vec<Result<StreamFrame, CirclError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn frames_decode_in_arrival_order() {
        let body: &[u8] = b"data: {\"type\":\"thought\",\"message\":\"a\"}\n\
                     data: {\"type\":\"response\",\"message\":\"b\"}\n\
                     data: {\"type\":\"end\"}\n";
        let frames = collect(frames_from_chunks(chunked(vec![body]))).await;

        assert_eq!(frames.len(), 2);
        assert_eq!(
            *frames[0].as_ref().unwrap(),
            StreamFrame::Thought("a".into())
        );
        assert_eq!(
            *frames[1].as_ref().unwrap(),
            StreamFrame::Response("b".into())
        );
    }

    #[tokio::test]
    async fn split_at_every_boundary_matches_single_chunk() {
        let body: &[u8] = b"data: {\"type\":\"thought\",\"message\":\"Analyz\"}\n\
                            data: {\"type\":\"thought\",\"message\":\"ing query\"}\n\
                            data: {\"type\":\"end\"}\n";

        let whole: Vec<StreamFrame> = collect(frames_from_chunks(chunked(vec![body])))
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        for split in 0..=body.len() {
            let split_frames: Vec<StreamFrame> =
                collect(frames_from_chunks(chunked(vec![&body[..split], &body[split..]])))
                    .await
                    .into_iter()
                    .map(|r| r.unwrap())
                    .collect();
            assert_eq!(split_frames, whole, "split at byte {split}");
        }
    }

    #[tokio::test]
    async fn error_frame_rejects_and_discards_rest_of_chunk() {
        let body: &[u8] = b"data: {\"type\":\"thought\",\"message\":\"a\"}\n\
                     data: {\"type\":\"error\",\"message\":\"boom\"}\n\
                     data: {\"type\":\"response\",\"message\":\"never seen\"}\n";
        let frames = collect(frames_from_chunks(chunked(vec![body]))).await;

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_ok());
        match frames[1].as_ref().unwrap_err() {
            CirclError::Api { message, .. } => assert_eq!(message, "boom"),
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn end_frame_stops_cleanly_and_discards_buffered_bytes() {
        let body: &[u8] = b"data: {\"type\":\"response\",\"message\":\"answer\"}\n\
                     data: {\"type\":\"end\"}\n\
                     data: {\"type\":\"response\",\"message\":\"discarded\"}\n";
        let frames = collect(frames_from_chunks(chunked(vec![body]))).await;

        assert_eq!(frames.len(), 1);
        assert_eq!(
            *frames[0].as_ref().unwrap(),
            StreamFrame::Response("answer".into())
        );
    }

    #[tokio::test]
    async fn end_frame_discards_later_chunks_too() {
        let frames = collect(frames_from_chunks(chunked(vec![
            b"data: {\"type\":\"end\"}\n" as &[u8],
            b"data: {\"type\":\"response\",\"message\":\"late\"}\n",
        ])))
        .await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn malformed_line_does_not_abort_stream() {
        let body: &[u8] = b"data: {broken json\n\
                     data: {\"type\":\"response\",\"message\":\"still here\"}\n\
                     data: {\"type\":\"end\"}\n";
        let frames = collect(frames_from_chunks(chunked(vec![body]))).await;

        assert_eq!(frames.len(), 1);
        assert_eq!(
            *frames[0].as_ref().unwrap(),
            StreamFrame::Response("still here".into())
        );
    }

    #[tokio::test]
    async fn stream_without_end_frame_terminates_at_transport_eof() {
        let body: &[u8] =
            b"data: {\"type\":\"response\",\"message\":\"partial\"}\ndata: {\"type\":\"resp";
        let frames = collect(frames_from_chunks(chunked(vec![body]))).await;

        // The unterminated trailing line is discarded.
        assert_eq!(frames.len(), 1);
        assert_eq!(
            *frames[0].as_ref().unwrap(),
            StreamFrame::Response("partial".into())
        );
    }

    #[tokio::test]
    async fn transport_error_mid_stream_surfaces_then_ends() {
        let items: Vec<Result<Vec<u8>, CirclError>> = vec![
            Ok(b"data: {\"type\":\"thought\",\"message\":\"a\"}\n".to_vec()),
            Err(CirclError::Transport {
                message: "connection reset".into(),
                source: None,
            }),
        ];
        let frames = collect(frames_from_chunks(stream::iter(items).boxed())).await;

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_ok());
        assert!(matches!(
            frames[1].as_ref().unwrap_err(),
            CirclError::Transport { .. }
        ));
    }
}
