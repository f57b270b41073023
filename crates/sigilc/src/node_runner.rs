//! Writes compiled modules to disk and shells out to `node` to execute
//! them, for the `run` and `test` subcommands. The compiler itself never
//! runs user code (spec §4.6); this is the one place the CLI does.

use std::path::{Path, PathBuf};
use std::process::Command;

use sigil_driver::CompiledModule;

pub struct WrittenModule {
    pub absolute: PathBuf,
}

/// Writes every compiled module's JS under `out_dir`, mirroring each
/// module's path relative to `project_root` so relative ES-module
/// imports between sibling modules still resolve. When `patch_main_export`
/// is set, the entry module's `main` function is given a trailing
/// `export { main };` if the source did not already export it -- `main`
/// only has to be *declared*, not exported, to satisfy the entry-file
/// rule, but a harness script can only reach it through an export.
pub fn write_modules(
    modules: &[CompiledModule],
    project_root: &Path,
    out_dir: &Path,
    patch_main_export: bool,
) -> std::io::Result<Vec<WrittenModule>> {
    let mut written = Vec::with_capacity(modules.len());
    for m in modules {
        let relative = m.path.strip_prefix(project_root).unwrap_or(&m.path).with_extension("js");
        let absolute = out_dir.join(&relative);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut js = m.js.clone();
        if patch_main_export
            && m.is_entry
            && js.contains("async function main(")
            && !js.contains("export async function main(")
        {
            js.push_str("\nexport { main };\n");
        }
        std::fs::write(&absolute, js)?;
        written.push(WrittenModule { absolute });
    }
    Ok(written)
}

pub fn run_node_script(script: &str) -> Result<String, String> {
    let output = Command::new("node")
        .arg("--input-type=module")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| format!("failed to invoke node: {}", e))?;
    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Builds the harness script for `run`: import the compiled entry module
/// and invoke `main`, printing whether it returned a value (Sigil's
/// `Unit` lowers to JS `undefined`) and the value itself as JSON.
pub fn build_run_script(entry_js: &Path) -> String {
    format!(
        r#"import({specifier}).then(async (m) => {{
  const result = await m.main();
  process.stdout.write(JSON.stringify({{ hasValue: result !== undefined, value: result === undefined ? null : result }}));
}}).catch((e) => {{
  process.stderr.write(String(e && e.stack || e));
  process.exit(1);
}});
"#,
        specifier = serde_json::to_string(&entry_js.display().to_string()).unwrap()
    )
}

/// Builds the harness script for `test`: import every compiled test
/// module in turn and run each of its `__sigil_tests` entries, collecting
/// one JSON result object per test onto a single array printed at the end.
pub fn build_test_script(specs: &[serde_json::Value]) -> String {
    format!(
        r#"(async () => {{
  const specs = {specs};
  const results = [];
  for (const spec of specs) {{
    const mod = await import(spec.path);
    for (const t of mod.__sigil_tests) {{
      const startedAt = Date.now();
      let status, failure;
      try {{
        const r = await t.body();
        status = r.status;
        failure = r.failure || null;
      }} catch (e) {{
        status = 'error';
        failure = {{ kind: 'exception', message: String(e && e.message || e) }};
      }}
      results.push({{
        file: spec.file,
        name: t.name,
        status,
        durationMs: Date.now() - startedAt,
        location: t.location,
        declaredEffects: t.declaredEffects,
        assertion: t.assertion,
        failure,
      }});
    }}
  }}
  process.stdout.write(JSON.stringify(results));
}})().catch((e) => {{
  process.stderr.write(String(e && e.stack || e));
  process.exit(1);
}});
"#,
        specs = serde_json::to_string(specs).unwrap()
    )
}
