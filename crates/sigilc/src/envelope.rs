//! Prints the stable JSON envelope (spec §6/§7) to stdout and maps it to
//! a process exit code. The envelope is the CLI's one stdout contract;
//! everything else (logs, pretty diagnostics) goes to stderr.

use sigil_common::diagnostic::Envelope;

pub fn emit(env: Envelope) -> ! {
    let ok = env.ok;
    match serde_json::to_writer(std::io::stdout(), &env) {
        Ok(()) => println!(),
        Err(e) => {
            eprintln!("error: failed to serialize result envelope: {}", e);
            std::process::exit(1);
        }
    }
    std::process::exit(if ok { 0 } else { 1 });
}
