//! Node.js core module names.

/// Top-level core modules importable with or without the `node:` prefix.
/// Subpaths such as `fs/promises` share their root with an entry here.
pub const BUILTIN_MODULES: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Core modules that only exist behind the `node:` scheme.
pub const NODE_PREFIX_ONLY_MODULES: &[&str] = &["sea", "sqlite", "test"];

pub fn is_builtin_module(root_name: &str) -> bool {
    match root_name.strip_prefix("node:") {
        Some(name) => {
            BUILTIN_MODULES.contains(&name) || NODE_PREFIX_ONLY_MODULES.contains(&name)
        }
        None => BUILTIN_MODULES.contains(&root_name),
    }
}
