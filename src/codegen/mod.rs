//! Generated module assembly.
//!
//! ```text
//! // Automatically generated by fwembed, do not touch
//!
//! #include <ESP8266WebServer.h>
//!
//! extern ESP8266WebServer server;
//!
//! const uint8_t app_js[] PROGMEM = { ... };     <- declarations, discovery order
//! const size_t app_js_len = 123;
//!
//! void setupFrontend() {                        <- route registrations
//!     server.on("/app.js", HTTP_GET, []() { ... });
//! }
//! ```

pub mod declare;
pub mod route;

use std::fmt::Write;

pub use declare::emit_declaration;
pub use route::{RouteRecord, emit_route, routes_for};

use crate::asset::AssetFile;

/// First line of every generated module.
pub const PREAMBLE: &str = "// Automatically generated by fwembed, do not touch";

/// Rendering parameters for the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Bytes per array row.
    pub chunk_width: usize,
    /// Name of the generated setup function.
    pub setup_fn: String,
    /// Name of the global server object.
    pub server: String,
    /// Type of the global server object.
    pub server_type: String,
    /// Headers included by the module.
    pub includes: Vec<String>,
    /// `Cache-Control: max-age` in seconds.
    pub max_age: u32,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            chunk_width: 12,
            setup_fn: "setupFrontend".into(),
            server: "server".into(),
            server_type: "ESP8266WebServer".into(),
            includes: vec!["ESP8266WebServer.h".into()],
            max_age: 86400,
        }
    }
}

/// The single output artifact, assembled in discovery order.
#[derive(Debug, Default)]
pub struct GeneratedModule {
    /// One rendered array + length block per asset.
    pub declarations: Vec<String>,
    /// One or two routes per asset.
    pub routes: Vec<RouteRecord>,
}

impl GeneratedModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a module from assets already in discovery order.
    pub fn from_assets(assets: &[AssetFile], options: &EmitOptions) -> Self {
        let mut module = Self::new();
        for asset in assets {
            module.push(asset, options);
        }
        module
    }

    /// Append the declaration and routes of one asset.
    pub fn push(&mut self, asset: &AssetFile, options: &EmitOptions) {
        self.declarations.push(emit_declaration(
            &asset.identifier,
            &asset.compressed,
            options.chunk_width,
        ));
        self.routes.extend(routes_for(
            &asset.relative_path,
            asset.mime,
            &asset.identifier,
        ));
    }

    /// Render the complete source text.
    pub fn render(&self, options: &EmitOptions) -> String {
        let body: usize = self.declarations.iter().map(String::len).sum();
        let mut out = String::with_capacity(body + self.routes.len() * 320 + 256);

        out.push_str(PREAMBLE);
        out.push_str("\n\n");
        for include in &options.includes {
            writeln!(out, "#include <{include}>").ok();
        }
        if !options.includes.is_empty() {
            out.push('\n');
        }
        writeln!(out, "extern {} {};\n", options.server_type, options.server).ok();

        for decl in &self.declarations {
            out.push_str(decl);
            out.push('\n');
        }

        writeln!(out, "void {}() {{", options.setup_fn).ok();
        for route in &self.routes {
            out.push_str(&emit_route(route, &options.server, options.max_age));
        }
        out.push_str("}\n");
        out
    }
}
