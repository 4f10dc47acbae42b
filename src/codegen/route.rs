//! Route records and the web server adapter.
//!
//! Routes are plain data. [`emit_route`] is the only code that knows the
//! server's calling convention (`ESP8266WebServer::on` / `send_P`).

use std::fmt::Write;

use super::declare::INDENT;
use crate::asset::ENTRY_DOCUMENT;
use crate::asset::ident::LEN_SUFFIX;

/// One GET route serving an embedded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// URL path, always starting with `/`.
    pub path: String,
    /// Identifier of the byte array served.
    pub identifier: String,
    /// Content type sent with the response.
    pub mime: &'static str,
}

/// Routes for one asset: `/<relative_path>`, preceded by `/` for the entry
/// document.
pub fn routes_for(relative_path: &str, mime: &'static str, identifier: &str) -> Vec<RouteRecord> {
    let route = |path: String| RouteRecord {
        path,
        identifier: identifier.to_string(),
        mime,
    };

    let mut routes = Vec::with_capacity(2);
    if relative_path == ENTRY_DOCUMENT {
        routes.push(route("/".to_string()));
    }
    routes.push(route(format!("/{relative_path}")));
    routes
}

/// Render the registration statement for `route` on the server object `server`.
///
/// ```text
///     server.on("/app.js", HTTP_GET, []() {
///         server.sendHeader("Content-Encoding", "gzip");
///         server.sendHeader("Cache-Control", "max-age=86400");
///         server.send_P(200, "application/javascript", (PGM_P)app_js, app_js_len);
///     });
/// ```
pub fn emit_route(route: &RouteRecord, server: &str, max_age: u32) -> String {
    let ident = &route.identifier;
    let body = format!("{INDENT}{INDENT}");
    let mut out = String::with_capacity(320);

    writeln!(
        out,
        "{INDENT}{server}.on({}, HTTP_GET, []() {{",
        c_string(&route.path)
    )
    .ok();
    writeln!(out, "{body}{server}.sendHeader(\"Content-Encoding\", \"gzip\");").ok();
    writeln!(
        out,
        "{body}{server}.sendHeader(\"Cache-Control\", \"max-age={max_age}\");"
    )
    .ok();
    writeln!(
        out,
        "{body}{server}.send_P(200, {}, (PGM_P){ident}, {ident}{LEN_SUFFIX});",
        c_string(route.mime)
    )
    .ok();
    writeln!(out, "{INDENT}}});").ok();
    out
}

/// Quote `s` as a C string literal.
pub fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // `??` starts a trigraph in older C++ dialects
            '?' => out.push_str("\\?"),
            c if c.is_ascii_control() => {
                write!(out, "\\{:03o}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
