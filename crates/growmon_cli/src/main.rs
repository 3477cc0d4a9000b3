//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `growmon_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("growmon_core ping={}", growmon_core::ping());
    println!("growmon_core version={}", growmon_core::core_version());
}
