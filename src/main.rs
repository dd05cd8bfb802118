use anyhow::{Context, Result};
use clipnote::session::AnnotationSession;
use clipnote::sync::http::HttpBackend;

/// Load-and-inspect driver: fetches one audio item and prints what the
/// editor would open with.
///
/// Usage: clipnote <base-url> <audio-id> <duration-secs>
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging/tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let base_url = args
        .next()
        .unwrap_or_else(|| "http://localhost:5000".to_string());
    let audio_id: u64 = args
        .next()
        .context("missing audio id argument")?
        .parse()
        .context("audio id must be a positive integer")?;
    let duration_secs: f64 = args
        .next()
        .context("missing clip duration argument")?
        .parse()
        .context("duration must be seconds as a number")?;

    let backend = HttpBackend::new(base_url);
    let session = AnnotationSession::load(backend, audio_id, duration_secs)
        .await
        .context("could not open editing session")?;

    println!(
        "{} ({} segments, marked for review: {})",
        session.filename(),
        session.store().records().len(),
        session.is_marked_for_review()
    );
    if !session.reference_transcription().is_empty() {
        println!("reference: {}", session.reference_transcription());
    }

    for record in session.store().records() {
        let sync_state = match record.backend_id() {
            Some(id) => format!("#{}", id),
            None => "unsynced".to_string(),
        };
        println!(
            "  [{:7.2}s..{:7.2}s] {} {:?} ({} annotations)",
            record.time_range.start,
            record.time_range.end,
            sync_state,
            record.transcription,
            record.annotations.len()
        );
    }

    Ok(())
}
