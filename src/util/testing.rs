//! Shared test setup: logging plus document fixtures.

use std::env;
use std::sync::{Arc, Once};

use chrono::{TimeZone, Utc};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{Document, RunFormatter, TrackedChanges};
use crate::domain::wml::WML_NS;
use crate::infrastructure::traits::{FixedClock, MarkupCodec};
use crate::infrastructure::XmlCodec;

static TEST_SETUP: Once = Once::new();

/// Author stamped on revisions made through [`document_from_body`].
pub const TEST_AUTHOR: &str = "tester";

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Frozen clock at 2024-01-02T03:04:05Z.
pub fn fixed_clock() -> FixedClock {
    FixedClock(
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .unwrap_or_default(),
    )
}

/// Full `document.xml` around the given body content.
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#
    )
}

/// Decode body content into a [`Document`] with a fixed clock and
/// [`TEST_AUTHOR`].
///
/// Panics on malformed markup; for tests only.
pub fn document_from_body(body: &str) -> Document {
    let tree = XmlCodec
        .decode(document_xml(body).as_bytes())
        .unwrap_or_else(|e| panic!("fixture markup: {e}"));
    Document::with_collaborators(
        tree,
        Box::new(RunFormatter),
        Box::new(TrackedChanges::new(TEST_AUTHOR)),
        Arc::new(fixed_clock()),
    )
    .unwrap_or_else(|e| panic!("fixture document: {e}"))
}
