//! Contextual greeting text for `/greet`.
//!
//! [`generate`] is pure: callers pass the visitor ordinal and the current
//! time, so the same inputs always produce the same text.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::{identity::ServiceIdentity, mode::Mode};

/// Name used when the request has no `name` parameter.
pub const DEFAULT_NAME: &str = "World";

/// Render the greeting body.
///
/// `requested_mode` is echoed back exactly as received. Only a
/// case-insensitive `"pirate"` changes the opening line; every other value is
/// a standard greeting.
pub fn generate(
    name: &str,
    visitor_number: u64,
    requested_mode: &str,
    current_mode: Mode,
    identity: &ServiceIdentity,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::with_capacity(256);

    if requested_mode.eq_ignore_ascii_case("pirate") {
        let _ = writeln!(out, "Ahoy, {name}! 🏴‍☠️");
    } else {
        let _ = writeln!(out, "Hello, {name}! 👋");
    }

    let _ = writeln!(out, "You are visitor #{visitor_number}");
    let _ = writeln!(out, "Service: {}", identity.service);
    let _ = writeln!(out, "Greeting Mode: {requested_mode}");
    let _ = writeln!(out, "App Mode: {current_mode}");
    let _ = writeln!(out, "Version: {}", identity.version);
    let _ = writeln!(out, "Git SHA: {}", identity.git_sha);
    let _ = writeln!(out, "Pod: {}", identity.pod_name);
    let _ = writeln!(out, "Instance: {}", identity.short_instance_id());
    let _ = writeln!(out, "Uptime: {}s", identity.uptime_secs_at(now));

    out
}
