//! Dynamic host-module loading (spec §4.6 "dynamically loads the
//! referenced host module"). The compiler never runs user code itself;
//! loading is delegated through this trait so the default Node
//! subprocess implementation can be swapped for a mock in tests or for
//! an alternate host runtime.

use std::process::Command;

/// Discovers the exported member names of a host module specifier
/// (e.g. `"node:fs/promises"` or `"./util.js"`).
pub trait ExternLoader {
    fn load(&mut self, specifier: &str) -> Result<Vec<String>, String>;
}

/// Loads a module by spawning `node` and dynamically `import()`-ing it,
/// printing its exported key names as a JSON array on stdout. Mirrors the
/// host-runtime assumption in spec §6: "the emitter assumes the host
/// runtime provides ECMAScript-module semantics and a dynamic import
/// facility".
pub struct NodeExternLoader {
    cache: rustc_hash::FxHashMap<String, Vec<String>>,
}

impl NodeExternLoader {
    pub fn new() -> Self {
        NodeExternLoader { cache: rustc_hash::FxHashMap::default() }
    }
}

impl Default for NodeExternLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternLoader for NodeExternLoader {
    fn load(&mut self, specifier: &str) -> Result<Vec<String>, String> {
        if let Some(members) = self.cache.get(specifier) {
            return Ok(members.clone());
        }
        let script = format!(
            "import({:?}).then(m => process.stdout.write(JSON.stringify(Object.keys(m)))).catch(e => {{ process.stderr.write(String(e && e.message || e)); process.exit(1); }})",
            specifier
        );
        tracing::debug!(specifier, "loading host module");
        let output = Command::new("node")
            .arg("--input-type=module")
            .arg("-e")
            .arg(&script)
            .output()
            .map_err(|e| format!("failed to invoke node: {}", e))?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let members: Vec<String> = serde_json::from_str(stdout.trim())
            .map_err(|e| format!("unexpected loader output for '{}': {}", specifier, e))?;
        self.cache.insert(specifier.to_string(), members.clone());
        Ok(members)
    }
}
