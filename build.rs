use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    // Read and increment build number
    let build_file = Path::new("BUILD_NUMBER");
    let build_number: u64 = fs::read_to_string(build_file)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    let new_build = build_number + 1;
    if fs::write(build_file, new_build.to_string()).is_err() {
        println!("cargo:warning=could not update BUILD_NUMBER");
    }

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    let is_release = profile == "release";

    // VERSION file overrides the package version
    let version = fs::read_to_string("VERSION")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.1.0".into()));

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=JPT_VERSION={}", version);
    println!("cargo:rustc-env=JPT_BUILD={}", new_build);
    println!("cargo:rustc-env=JPT_PROFILE={}", if is_release { "release" } else { "development" });
    println!("cargo:rustc-env=JPT_GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=BUILD_NUMBER");
    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
