//! Generation pipeline.
//!
//! ```text
//! run ──► front-end build (BuildTool) ──► dist exists?
//!                                             │
//!        discover ──► assign identifiers (sequential, collision check)
//!                          │
//!                          ▼
//!        read + gzip + mime (parallel, order kept)
//!                          │
//!                          ▼
//!        GeneratedModule ──► render ──► write once (temp + rename)
//! ```
//!
//! Nothing is written unless every step before the final write succeeded.

use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    asset::{AssetFile, IdentRegistry, discover},
    codegen::{EmitOptions, GeneratedModule},
    debug,
    error::GenerateError,
    log,
    utils::exec::BuildTool,
};

/// Parameters of one generation run, fixed for its duration.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Front-end project directory, the build command runs here.
    pub frontend_dir: PathBuf,
    /// Build output directory whose files get embedded.
    pub dist_dir: PathBuf,
    /// Generated module path.
    pub output_path: PathBuf,
    /// Build command: program followed by arguments.
    pub command: Vec<String>,
    /// Gzip level.
    pub compression_level: u32,
    /// Rendering options.
    pub emit: EmitOptions,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub assets: usize,
    pub routes: usize,
    pub raw_bytes: usize,
    pub compressed_bytes: usize,
}

impl Summary {
    fn of(assets: &[AssetFile], module: &GeneratedModule) -> Self {
        Self {
            assets: assets.len(),
            routes: module.routes.len(),
            raw_bytes: assets.iter().map(|a| a.raw.len()).sum(),
            compressed_bytes: assets.iter().map(|a| a.compressed.len()).sum(),
        }
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// Run the front-end build, then generate and write the module.
pub fn run(ctx: &BuildContext, tool: &dyn BuildTool) -> Result<Summary, GenerateError> {
    run_frontend_build(ctx, tool)?;
    generate(ctx)
}

/// Run the external front-end build in `ctx.frontend_dir`.
pub fn run_frontend_build(ctx: &BuildContext, tool: &dyn BuildTool) -> Result<(), GenerateError> {
    if !ctx.frontend_dir.is_dir() {
        return Err(GenerateError::FrontendDirMissing(ctx.frontend_dir.clone()));
    }

    let program = ctx.command.first().cloned().unwrap_or_default();
    log!("frontend"; "running `{}`", ctx.command.join(" "));

    let exit = tool
        .execute(&ctx.command, &ctx.frontend_dir)
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => GenerateError::BuildToolMissing(program.clone()),
            _ => GenerateError::io(&ctx.frontend_dir, err),
        })?;

    if !exit.success() {
        return Err(GenerateError::BuildToolFailed {
            program,
            // killed by a signal: report a generic failure
            code: exit.exit_code().unwrap_or(1),
        });
    }
    Ok(())
}

/// Embed the existing build output and write the module.
pub fn generate(ctx: &BuildContext) -> Result<Summary, GenerateError> {
    let assets = collect_assets(ctx)?;
    let module = GeneratedModule::from_assets(&assets, &ctx.emit);
    let text = module.render(&ctx.emit);

    write_module(&ctx.output_path, &text)?;

    let summary = Summary::of(&assets, &module);
    log!("embed"; "generated {}", ctx.output_path.display());
    Ok(summary)
}

/// Discover, name and compress every asset under `ctx.dist_dir`.
///
/// The result is in discovery order regardless of how compression is
/// scheduled.
pub fn collect_assets(ctx: &BuildContext) -> Result<Vec<AssetFile>, GenerateError> {
    if !ctx.dist_dir.is_dir() {
        return Err(GenerateError::OutputMissing(ctx.dist_dir.clone()));
    }

    let paths = discover(&ctx.dist_dir)?;

    // Identifiers are assigned up front so a collision fails before any file is read
    let mut registry = IdentRegistry::new();
    let named = paths
        .into_iter()
        .map(|rel| registry.assign(&rel).map(|ident| (rel, ident)))
        .collect::<Result<Vec<_>, _>>()?;

    named
        .into_par_iter()
        .map(|(rel, ident)| {
            let asset = AssetFile::load(&ctx.dist_dir, &rel, ident, ctx.compression_level)?;
            debug!("embed"; "{} -> {} ({} -> {} bytes)",
                asset.relative_path, asset.identifier, asset.raw.len(), asset.compressed.len());
            Ok::<_, GenerateError>(asset)
        })
        .collect()
}

/// Write `text` to `path` through a sibling temporary file.
///
/// The destination is either left untouched or fully replaced.
fn write_module(path: &Path, text: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, text).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        GenerateError::io(&tmp, e)
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        GenerateError::io(path, e)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::exec::ToolExit;
    use flate2::read::GzDecoder;
    use std::cell::RefCell;
    use std::io::Read;
    use tempfile::TempDir;

    /// Build tool double: optionally writes files into dist, then exits.
    struct FakeTool {
        exit: io::Result<ToolExit>,
        outputs: Vec<(&'static str, &'static [u8])>,
        dist: PathBuf,
        calls: RefCell<Vec<(Vec<String>, PathBuf)>>,
    }

    impl FakeTool {
        fn succeeding(dist: &Path, outputs: Vec<(&'static str, &'static [u8])>) -> Self {
            Self {
                exit: Ok(ToolExit::SUCCESS),
                outputs,
                dist: dist.to_path_buf(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn exiting(exit: io::Result<ToolExit>) -> Self {
            Self {
                exit,
                outputs: Vec::new(),
                dist: PathBuf::new(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl BuildTool for FakeTool {
        fn execute(&self, command: &[String], cwd: &Path) -> io::Result<ToolExit> {
            self.calls
                .borrow_mut()
                .push((command.to_vec(), cwd.to_path_buf()));
            for (rel, bytes) in &self.outputs {
                let path = self.dist.join(rel);
                fs::create_dir_all(path.parent().unwrap())?;
                fs::write(path, bytes)?;
            }
            match &self.exit {
                Ok(exit) => Ok(*exit),
                Err(err) => Err(io::Error::new(err.kind(), err.to_string())),
            }
        }
    }

    fn context(root: &Path) -> BuildContext {
        fs::create_dir_all(root.join("gui")).unwrap();
        BuildContext {
            frontend_dir: root.join("gui"),
            dist_dir: root.join("gui/dist"),
            output_path: root.join("src/frontend.cpp"),
            command: vec!["pnpm".into(), "run".into(), "build".into()],
            compression_level: 9,
            emit: EmitOptions::default(),
        }
    }

    fn write_dist(ctx: &BuildContext, files: &[(&str, &[u8])]) {
        for (rel, bytes) in files {
            let path = ctx.dist_dir.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }
    }

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    /// Extract the bytes of array `ident` from generated text.
    fn array_bytes(text: &str, ident: &str) -> Vec<u8> {
        let header = format!("const uint8_t {ident}[] PROGMEM = {{\n");
        let start = text.find(&header).unwrap() + header.len();
        let end = start + text[start..].find("};").unwrap();
        text[start..end]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16).unwrap())
            .collect()
    }

    const INDEX: &[u8] = b"<p>hi</p>\n";
    const APP: &[u8] = b"console.log('hello')";

    #[test]
    fn test_scenario_index_and_app() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let tool = FakeTool::succeeding(&ctx.dist_dir, vec![("index.html", INDEX), ("app.js", APP)]);

        let summary = run(&ctx, &tool).unwrap();
        assert_eq!(summary.assets, 2);
        assert_eq!(summary.routes, 3);
        assert_eq!(summary.raw_bytes, 30);

        let calls = tool.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["pnpm", "run", "build"]);
        assert_eq!(calls[0].1, ctx.frontend_dir);

        let text = fs::read_to_string(&ctx.output_path).unwrap();

        // declarations in sorted discovery order
        let app_pos = text.find("const uint8_t app_js[]").unwrap();
        let index_pos = text.find("const uint8_t index_html[]").unwrap();
        assert!(app_pos < index_pos);

        let app = array_bytes(&text, "app_js");
        let index = array_bytes(&text, "index_html");
        assert!(text.contains(&format!("const size_t app_js_len = {};", app.len())));
        assert!(text.contains(&format!("const size_t index_html_len = {};", index.len())));
        assert_eq!(summary.compressed_bytes, app.len() + index.len());

        // three routes, root alias first
        assert_eq!(text.matches(".on(").count(), 3);
        let root = text.find("server.on(\"/\", HTTP_GET").unwrap();
        let index_route = text.find("server.on(\"/index.html\", HTTP_GET").unwrap();
        let app_route = text.find("server.on(\"/app.js\", HTTP_GET").unwrap();
        assert!(app_route < root && root < index_route);
        assert_eq!(text.matches("(PGM_P)index_html, index_html_len").count(), 2);
        assert_eq!(text.matches("(PGM_P)app_js, app_js_len").count(), 1);
        assert_eq!(text.matches("\"Content-Encoding\", \"gzip\"").count(), 3);
        assert_eq!(text.matches("\"Cache-Control\", \"max-age=86400\"").count(), 3);
        assert_eq!(text.matches("send_P(200, ").count(), 3);
        assert!(text.contains("send_P(200, \"text/html\""));
        assert!(text.contains("send_P(200, \"application/javascript\""));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let big: Vec<u8> = (0..5000u32).map(|i| (i * 7 % 256) as u8).collect();
        write_dist(
            &ctx,
            &[("index.html", INDEX), ("assets/app.js", APP), ("img/logo.png", big.as_slice())],
        );

        generate(&ctx).unwrap();
        let text = fs::read_to_string(&ctx.output_path).unwrap();

        assert_eq!(gunzip(&array_bytes(&text, "index_html")), INDEX);
        assert_eq!(gunzip(&array_bytes(&text, "assets_app_js")), APP);
        assert_eq!(gunzip(&array_bytes(&text, "img_logo_png")), big);
        assert!(text.contains("send_P(200, \"image/png\", (PGM_P)img_logo_png"));
    }

    #[test]
    fn test_deterministic_output() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        write_dist(
            &ctx,
            &[
                ("index.html", INDEX),
                ("b/z.css", b"a{}".as_slice()),
                ("a/y.js", APP),
                ("B.svg", b"<svg/>".as_slice()),
                ("data.xyz", b"\x00\x01\x02".as_slice()),
            ],
        );

        generate(&ctx).unwrap();
        let first = fs::read(&ctx.output_path).unwrap();
        generate(&ctx).unwrap();
        let second = fs::read(&ctx.output_path).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        let order: Vec<_> = ["B_svg", "a_y_js", "b_z_css", "data_xyz", "index_html"]
            .iter()
            .map(|id| text.find(&format!("const uint8_t {id}[]")).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("\"application/octet-stream\", (PGM_P)data_xyz"));
    }

    #[test]
    fn test_only_entry_document_is_aliased() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        write_dist(
            &ctx,
            &[("index.html", INDEX), ("docs/index.html", INDEX), ("app.js", APP)],
        );

        let summary = generate(&ctx).unwrap();
        assert_eq!(summary.routes, 4);

        let text = fs::read_to_string(&ctx.output_path).unwrap();
        assert_eq!(text.matches("server.on(\"/\",").count(), 1);
        assert_eq!(text.matches("(PGM_P)docs_index_html,").count(), 1);
    }

    #[test]
    fn test_chunk_width_applied() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(dir.path());
        ctx.emit.chunk_width = 5;
        write_dist(&ctx, &[("app.js", APP)]);

        generate(&ctx).unwrap();
        let text = fs::read_to_string(&ctx.output_path).unwrap();

        let n = array_bytes(&text, "app_js").len();
        let start = text.find("const uint8_t app_js[]").unwrap();
        let rows = text[start..]
            .lines()
            .skip(1)
            .take_while(|l| *l != "};")
            .count();
        assert_eq!(rows, n.div_ceil(5));
    }

    #[test]
    fn test_duplicate_identifier_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let tool = FakeTool::succeeding(&ctx.dist_dir, vec![("a.b", b"one".as_slice()), ("a_b", b"two".as_slice())]);

        let err = run(&ctx, &tool).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::DuplicateIdentifier { ref name, .. } if name == "a_b"
        ));
        assert!(!ctx.output_path.exists());
    }

    #[test]
    fn test_output_missing_keeps_previous_module() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        fs::create_dir_all(ctx.output_path.parent().unwrap()).unwrap();
        fs::write(&ctx.output_path, "previous").unwrap();

        // build claims success but produces nothing
        let tool = FakeTool::succeeding(&ctx.dist_dir, Vec::new());
        let err = run(&ctx, &tool).unwrap_err();

        assert!(matches!(err, GenerateError::OutputMissing(ref p) if *p == ctx.dist_dir));
        assert_eq!(fs::read_to_string(&ctx.output_path).unwrap(), "previous");
    }

    #[test]
    fn test_output_missing_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let err = generate(&ctx).unwrap_err();
        assert!(matches!(err, GenerateError::OutputMissing(_)));
        assert!(!ctx.output_path.exists());
        assert!(!dir.path().join("src").exists());
    }

    #[test]
    fn test_build_tool_failed_propagates_code() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        write_dist(&ctx, &[("index.html", INDEX)]);

        let tool = FakeTool::exiting(Ok(ToolExit::code(2)));
        let err = run(&ctx, &tool).unwrap_err();

        assert!(matches!(err, GenerateError::BuildToolFailed { code: 2, ref program } if program == "pnpm"));
        assert_eq!(err.exit_code(), 2);
        // a stale dist must not be embedded after a failed build
        assert!(!ctx.output_path.exists());
    }

    #[test]
    fn test_build_tool_signaled() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let tool = FakeTool::exiting(Ok(ToolExit::signaled()));
        let err = run(&ctx, &tool).unwrap_err();
        assert!(matches!(err, GenerateError::BuildToolFailed { code: 1, .. }));
    }

    #[test]
    fn test_build_tool_missing() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());

        let tool = FakeTool::exiting(Err(io::Error::new(io::ErrorKind::NotFound, "no pnpm")));
        let err = run(&ctx, &tool).unwrap_err();

        assert!(matches!(err, GenerateError::BuildToolMissing(ref p) if p == "pnpm"));
        assert!(!ctx.output_path.exists());
    }

    #[test]
    fn test_frontend_dir_missing() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(dir.path());
        ctx.frontend_dir = dir.path().join("web");

        let tool = FakeTool::exiting(Ok(ToolExit::SUCCESS));
        let err = run(&ctx, &tool).unwrap_err();

        assert!(matches!(err, GenerateError::FrontendDirMissing(_)));
        assert!(tool.calls.borrow().is_empty());
    }

    #[test]
    fn test_write_module_replaces_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/frontend.cpp");

        write_module(&path, "first").unwrap();
        write_module(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("out/frontend.cpp.tmp").exists());
    }

    #[test]
    fn test_write_module_failure_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frontend.cpp");
        fs::write(&path, "previous").unwrap();

        // Temporary path taken by a directory, so the write itself fails
        fs::create_dir(dir.path().join("frontend.cpp.tmp")).unwrap();

        let err = write_module(&path, "next").unwrap_err();
        assert!(matches!(err, GenerateError::Io(ref p, _) if p.ends_with("frontend.cpp.tmp")));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }
}
