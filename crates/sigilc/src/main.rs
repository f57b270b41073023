//! The Sigil compiler CLI.
//!
//! Provides `sigilc` with five subcommands:
//!
//! - `lex <file>` - emit the token stream as JSON
//! - `parse <file>` - emit the AST as JSON
//! - `compile <file>` - run the full pipeline, writing JS + semantic maps
//! - `run <file>` - compile, then execute via node and print the result
//! - `test [directory]` - compile and execute test files, emitting results
//!
//! Every subcommand prints the stable JSON envelope (spec §6/§7) to
//! stdout and sets its exit code from the envelope's `ok` field. Nothing
//! else in this binary carries compiler logic; it owns process exit
//! codes and stdout/stderr plumbing over the driver crate.

mod discovery;
mod envelope;
mod node_runner;
mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use sigil_common::config::ProjectConfig;
use sigil_common::diagnostic::{Assertion, Diagnostic, Envelope as Env, Failure, Phase, Summary, TestResult, TestStatus};
use sigil_common::span::Span;
use sigil_driver::ModuleRoots;
use sigil_extern::NodeExternLoader;

#[derive(Parser)]
#[command(name = "sigilc", version, about = "The Sigil compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lex a source file and emit its token stream as JSON
    Lex { file: PathBuf },
    /// Parse a source file and emit its AST as JSON
    Parse { file: PathBuf },
    /// Compile a project, writing emitted JS and semantic maps
    Compile {
        /// Entry file (must declare `main`)
        file: PathBuf,
        /// Output directory; defaults to the project's configured out layout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compile and execute a project's entry file via node
    Run { file: PathBuf },
    /// Compile and execute test files under a directory
    Test { directory: Option<PathBuf> },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let env = match cli.command {
        Commands::Lex { file } => cmd_lex(&file),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::Compile { file, output } => cmd_compile(&file, output),
        Commands::Run { file } => cmd_run(&file),
        Commands::Test { directory } => cmd_test(directory),
    };
    envelope::emit(env);
}

fn project_root_of(file: &Path) -> PathBuf {
    file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

fn load_config(command: &str, project_root: &Path) -> Result<ProjectConfig, Env> {
    ProjectConfig::load(project_root)
        .map_err(|message| Env::failure(command, Diagnostic::new("SIGIL-CLI-CONFIG", Phase::Linker, message)))
}

fn module_roots(project_root: &Path, config: &ProjectConfig) -> ModuleRoots {
    ModuleRoots::new(project_root.join("stdlib"), project_root.join(&config.layout.src))
}

fn generated_at() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn io_failure(command: &str, err: std::io::Error) -> Env {
    Env::failure(command, Diagnostic::new("SIGIL-CLI-IO", Phase::Linker, err.to_string()))
}

fn read_source(command: &str, file: &Path) -> Result<String, Env> {
    std::fs::read_to_string(file).map_err(|e| io_failure(command, e))
}

fn cmd_lex(file: &Path) -> Env {
    let source = match read_source("lex", file) {
        Ok(s) => s,
        Err(env) => return env,
    };
    match sigil_lexer::lex(&source) {
        Ok(tokens) => Env::success("lex", serde_json::json!({ "tokens": tokens })),
        Err(diag) => {
            render::eprint_diagnostic(&source, &diag);
            Env::failure("lex", diag)
        }
    }
}

fn cmd_parse(file: &Path) -> Env {
    let source = match read_source("parse", file) {
        Ok(s) => s,
        Err(env) => return env,
    };
    let tokens = match sigil_lexer::lex(&source) {
        Ok(t) => t,
        Err(diag) => {
            render::eprint_diagnostic(&source, &diag);
            return Env::failure("parse", diag);
        }
    };
    match sigil_parser::parse(&source, tokens) {
        Ok(file) => Env::success("parse", serde_json::to_value(&file).unwrap_or(serde_json::Value::Null)),
        Err(err) => {
            let diag: Diagnostic = err.into();
            render::eprint_diagnostic(&source, &diag);
            Env::failure("parse", diag)
        }
    }
}

fn cmd_compile(file: &Path, output: Option<PathBuf>) -> Env {
    let project_root = project_root_of(file);
    let config = match load_config("compile", &project_root) {
        Ok(c) => c,
        Err(env) => return env,
    };
    let roots = module_roots(&project_root, &config);
    let out_root = output.unwrap_or_else(|| project_root.join(&config.layout.out));
    let mut loader = NodeExternLoader::new();
    let generated_at = generated_at();

    let modules = match sigil_driver::compile_project(file, &roots, &generated_at, &mut loader) {
        Ok(m) => m,
        Err(diag) => return Env::failure("compile", diag),
    };

    let mut outputs = Vec::with_capacity(modules.len());
    for m in &modules {
        let relative = m.path.strip_prefix(&project_root).unwrap_or(&m.path);
        let js_path = out_root.join(relative).with_extension("js");
        let map_path = out_root.join(relative).with_extension("mint.map");
        if let Some(parent) = js_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return io_failure("compile", e);
            }
        }
        if let Err(e) = std::fs::write(&js_path, &m.js) {
            return io_failure("compile", e);
        }
        let map_json = match serde_json::to_string_pretty(&m.semantic_map) {
            Ok(j) => j,
            Err(e) => return Env::failure("compile", Diagnostic::new("SIGIL-CLI-SEMMAP-ENCODE", Phase::Codegen, e.to_string())),
        };
        if let Err(e) = std::fs::write(&map_path, map_json) {
            return io_failure("compile", e);
        }
        outputs.push(serde_json::json!({
            "module": m.name,
            "js": js_path.display().to_string(),
            "semanticMap": map_path.display().to_string(),
        }));
    }

    Env::success("compile", serde_json::json!({ "outputs": outputs }))
}

fn cmd_run(file: &Path) -> Env {
    let project_root = project_root_of(file);
    let config = match load_config("run", &project_root) {
        Ok(c) => c,
        Err(env) => return env,
    };
    let roots = module_roots(&project_root, &config);
    let mut loader = NodeExternLoader::new();
    let generated_at = generated_at();

    let modules = match sigil_driver::compile_project(file, &roots, &generated_at, &mut loader) {
        Ok(m) => m,
        Err(diag) => return Env::failure("run", diag),
    };

    let out_dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => return io_failure("run", e),
    };
    let written = match node_runner::write_modules(&modules, &project_root, out_dir.path(), true) {
        Ok(w) => w,
        Err(e) => return io_failure("run", e),
    };
    let Some((_, entry)) = modules.iter().zip(written.iter()).find(|(m, _)| m.is_entry) else {
        return Env::failure("run", Diagnostic::new("SIGIL-CLI-NO-ENTRY", Phase::Linker, "no entry module was compiled"));
    };

    let script = node_runner::build_run_script(&entry.absolute);
    let stdout = match node_runner::run_node_script(&script) {
        Ok(s) => s,
        Err(message) => return Env::failure("run", Diagnostic::new("SIGIL-CLI-NODE", Phase::Linker, message)),
    };
    let parsed: serde_json::Value = match serde_json::from_str(stdout.trim()) {
        Ok(v) => v,
        Err(e) => return Env::failure("run", Diagnostic::new("SIGIL-CLI-NODE-OUTPUT", Phase::Linker, e.to_string())),
    };

    let result = if parsed.get("hasValue").and_then(|v| v.as_bool()).unwrap_or(false) {
        parsed.get("value").cloned().unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::Null
    };
    Env::success("run", serde_json::json!({ "result": result }))
}

fn cmd_test(directory: Option<PathBuf>) -> Env {
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match load_config("test", &project_root) {
        Ok(c) => c,
        Err(env) => return env,
    };
    let test_dir = directory.unwrap_or_else(|| project_root.join(&config.layout.tests));
    let files = match discovery::discover_sig_files(&test_dir) {
        Ok(f) => f,
        Err(e) => return io_failure("test", e),
    };

    let started = std::time::Instant::now();
    let roots = module_roots(&project_root, &config);
    let mut loader = NodeExternLoader::new();
    let generated_at = generated_at();

    let out_dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => return io_failure("test", e),
    };

    let mut errored_files = 0usize;
    let mut entries: Vec<(String, PathBuf)> = Vec::new();

    for relative in &files {
        let abs_path = test_dir.join(relative);
        let modules = match sigil_driver::compile_unit(&abs_path, &roots, &generated_at, &mut loader) {
            Ok(m) => m,
            Err(_) => {
                errored_files += 1;
                continue;
            }
        };
        let written = match node_runner::write_modules(&modules, &project_root, out_dir.path(), false) {
            Ok(w) => w,
            Err(_) => {
                errored_files += 1;
                continue;
            }
        };
        if let Some((_, w)) = modules.iter().zip(written.iter()).find(|(m, _)| m.is_entry) {
            entries.push((relative.to_string_lossy().to_string(), w.absolute.clone()));
        }
    }

    let mut results: Vec<TestResult> = Vec::new();
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut errored_tests = 0usize;

    if !entries.is_empty() {
        let specs: Vec<serde_json::Value> = entries
            .iter()
            .map(|(file, path)| serde_json::json!({ "file": file, "path": path.display().to_string() }))
            .collect();
        let script = node_runner::build_test_script(&specs);
        match node_runner::run_node_script(&script) {
            Ok(stdout) => match serde_json::from_str::<serde_json::Value>(stdout.trim()) {
                Ok(serde_json::Value::Array(items)) => {
                    for item in items {
                        let status = status_from_str(item.get("status").and_then(|v| v.as_str()).unwrap_or("error"));
                        match status {
                            TestStatus::Pass => passed += 1,
                            TestStatus::Fail => failed += 1,
                            TestStatus::Error => errored_tests += 1,
                        }
                        results.push(test_result_from_json(&item, status));
                    }
                }
                _ => return Env::failure("test", Diagnostic::new("SIGIL-CLI-NODE-OUTPUT", Phase::Linker, "test runner did not return a JSON array")),
            },
            Err(message) => return Env::failure("test", Diagnostic::new("SIGIL-CLI-NODE", Phase::Linker, message)),
        }
    }

    let summary = Summary {
        files: files.len(),
        discovered: entries.len(),
        selected: entries.len(),
        passed,
        failed,
        errored: errored_files + errored_tests,
        skipped: 0,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    Env::test_run("test", summary, results)
}

fn status_from_str(s: &str) -> TestStatus {
    match s {
        "pass" => TestStatus::Pass,
        "fail" => TestStatus::Fail,
        _ => TestStatus::Error,
    }
}

fn span_from_json(v: &serde_json::Value) -> Span {
    let start = v.get("start").and_then(|x| x.as_u64()).unwrap_or(0) as u32;
    let end = v.get("end").and_then(|x| x.as_u64()).unwrap_or(start) as u32;
    Span::new(start, end.max(start))
}

fn failure_from_json(v: Option<&serde_json::Value>) -> Option<Failure> {
    let v = v?;
    let kind = v.get("kind")?.as_str()?;
    match kind {
        "assert_false" => Some(Failure::AssertFalse),
        "comparison_mismatch" => Some(Failure::ComparisonMismatch {
            operator: v.get("operator")?.as_str()?.to_string(),
            actual: v.get("actual")?.as_str()?.to_string(),
            expected: v.get("expected")?.as_str()?.to_string(),
            diff_hint: v.get("diffHint").and_then(|d| d.as_str()).map(str::to_string),
        }),
        "exception" => Some(Failure::Exception { message: v.get("message")?.as_str().unwrap_or_default().to_string() }),
        _ => None,
    }
}

fn test_result_from_json(item: &serde_json::Value, status: TestStatus) -> TestResult {
    let file = item.get("file").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let name = item.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    TestResult {
        id: format!("{}#{}", file, name),
        file,
        name,
        status,
        duration_ms: item.get("durationMs").and_then(|v| v.as_u64()).unwrap_or(0),
        location: item.get("location").map(span_from_json).unwrap_or_default(),
        declared_effects: item
            .get("declaredEffects")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|e| e.as_str().map(String::from)).collect())
            .unwrap_or_default(),
        assertion: item.get("assertion").and_then(|v| v.as_str()).map(|k| Assertion { kind: k.to_string(), operator: None }),
        failure: failure_from_json(item.get("failure")),
    }
}
