//! Multi-segment long-form generator (§4.6): chains bounded generation
//! rounds back-to-back for a streaming chat completion, emitting each round
//! as one segment.
//!
//! Transport-agnostic by design (mirrors the teacher's `stream-event` crate
//! boundary): this module knows nothing about SSE or sockets. It drives a
//! [`SegmentSink`] that `serve`'s stream engine implements.

use async_trait::async_trait;

use crate::generator::{Generator, MID_STREAM_FALLBACK, UNAVAILABLE_FALLBACK_PREFIX};

/// Target character length per round.
pub const SEGMENT_CHARS: usize = 1400;
/// Hard cap on the number of rounds.
pub const MAX_SEGMENTS: u32 = 6;
/// How much of the cumulative text is carried into the next round's
/// instructions (§4.6 "tail (last 1500 chars)").
const TAIL_CHARS: usize = 1500;

/// Receives each produced segment as it is generated. Implemented by the
/// stream engine; a round's text is handed over as soon as the round's
/// generation completes (no buffering across rounds).
#[async_trait]
pub trait SegmentSink: Send {
    async fn emit_segment(&mut self, text: &str);
}

fn tail(text: &str, n: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= n {
        text.to_string()
    } else {
        chars[chars.len() - n..].iter().collect()
    }
}

fn round_instructions(round: u32, cumulative: &str) -> String {
    let base = format!(
        "Continue succinctly, aim for about {SEGMENT_CHARS} characters. Do not repeat what has already been said."
    );
    if round == 1 {
        base
    } else {
        format!("{base}\n\nText so far (tail):\n{}", tail(cumulative, TAIL_CHARS))
    }
}

fn round_prompt(round: u32, base_prompt: &str) -> String {
    if round == 1 {
        base_prompt.to_string()
    } else {
        format!("{base_prompt}\n\nassistant:")
    }
}

/// `true` when the most recently produced segment was short enough that the
/// generator likely considers the answer complete (§4.6 termination
/// heuristic).
fn should_stop(cumulative_len: usize, round: u32) -> bool {
    let threshold = (SEGMENT_CHARS as f64) * (round as f64 - 1.0) + 0.6 * SEGMENT_CHARS as f64;
    (cumulative_len as f64) < threshold
}

/// Runs the multi-segment loop, feeding each produced segment to `sink`.
/// Returns the full cumulative text (used by callers that also want to log
/// or persist the final answer).
pub async fn run_multi_segment(
    generator: &dyn Generator,
    base_prompt: &str,
    sink: &mut dyn SegmentSink,
) -> String {
    if !generator.is_available().await {
        let fallback = format!("{UNAVAILABLE_FALLBACK_PREFIX}the on-device model is not ready.");
        sink.emit_segment(&fallback).await;
        return fallback;
    }

    let mut cumulative = String::new();
    for round in 1..=MAX_SEGMENTS {
        let instructions = round_instructions(round, &cumulative);
        let prompt = round_prompt(round, base_prompt);
        match generator.generate(&instructions, &prompt).await {
            Ok(segment) => {
                cumulative.push_str(&segment);
                sink.emit_segment(&segment).await;
                if should_stop(cumulative.chars().count(), round) {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, round, "generator error mid multi-segment stream");
                sink.emit_segment(MID_STREAM_FALLBACK).await;
                cumulative.push_str(MID_STREAM_FALLBACK);
                break;
            }
        }
    }
    cumulative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Generator, MockGenerator};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        segments: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SegmentSink for RecordingSink {
        async fn emit_segment(&mut self, text: &str) {
            self.segments.lock().unwrap().push(text.to_string());
        }
    }

    #[tokio::test]
    async fn short_reply_stops_after_one_round() {
        let gen = MockGenerator::always_replies("Hello, world!");
        let mut sink = RecordingSink::default();
        let cumulative = run_multi_segment(&gen, "prompt", &mut sink).await;
        assert_eq!(cumulative, "Hello, world!");
        assert_eq!(sink.segments.lock().unwrap().len(), 1);
    }

    struct CountingGenerator {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String, String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            // Always return a long segment so termination never triggers early;
            // exercises the max_segments cap.
            Ok("x".repeat(SEGMENT_CHARS))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn long_replies_stop_at_max_segments() {
        let gen = CountingGenerator {
            calls: Mutex::new(0),
        };
        let mut sink = RecordingSink::default();
        run_multi_segment(&gen, "prompt", &mut sink).await;
        assert_eq!(*gen.calls.lock().unwrap(), MAX_SEGMENTS);
        assert_eq!(sink.segments.lock().unwrap().len(), MAX_SEGMENTS as usize);
    }

    #[tokio::test]
    async fn unavailable_generator_emits_single_fallback_segment() {
        let gen = MockGenerator::unavailable();
        let mut sink = RecordingSink::default();
        run_multi_segment(&gen, "prompt", &mut sink).await;
        let segments = sink.segments.lock().unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].starts_with(crate::generator::UNAVAILABLE_FALLBACK_PREFIX));
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String, String> {
            Err("boom".to_string())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn generator_error_emits_one_fallback_and_stops() {
        let gen = FailingGenerator;
        let mut sink = RecordingSink::default();
        run_multi_segment(&gen, "prompt", &mut sink).await;
        let segments = sink.segments.lock().unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], MID_STREAM_FALLBACK);
    }
}
