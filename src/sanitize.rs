use std::sync::OnceLock;

use regex::Regex;

/// Characters dropped outright before the underscore pass.
const STRIPPED: &str = "!@#$%^&*()+={}[]|\\:;\"'<>,.?/~`";

fn replaceable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("static pattern compiles"))
}

/// Turns a raw application name into the identifier used for CLI calls and reports.
pub fn sanitize(raw: &str) -> String {
    let stripped: String = raw.trim().chars().filter(|c| !STRIPPED.contains(*c)).collect();
    replaceable().replace_all(&stripped, "_").into_owned()
}
